pub mod block;
pub mod units;

pub use block::{Block, Transaction};
pub use units::{format_ether, format_units, parse_quantity, WEI_DECIMALS};
