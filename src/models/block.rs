use crate::models::units::format_units;

/// A block as fetched from the node, with full transaction objects
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub number: u64,
    /// Absent for pending blocks
    pub hash: Option<String>,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    /// None for contract creation
    pub to: Option<String>,
    /// Amount in the smallest currency unit
    pub value: u128,
}

impl Transaction {
    pub fn recipient(&self) -> &str {
        self.to.as_deref().unwrap_or("contract creation")
    }

    /// One console line: hash, sender, recipient and value in display units
    pub fn display_line(&self, decimals: u32, symbol: &str) -> String {
        format!(
            "{} from={} to={} value={} {}",
            self.hash,
            self.from,
            self.recipient(),
            format_units(self.value, decimals),
            symbol
        )
    }
}
