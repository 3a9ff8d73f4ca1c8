use ladder_types::Address;

/// Who is calling and when
///
/// Every state-changing entry point takes one of these. The clock value is
/// read once at the start of the call and never advances inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    /// Unix seconds
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}
