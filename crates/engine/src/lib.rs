pub use buy_campaigns::{BuyCampaign, BuyStatus};
pub use buy_contributions::BuyContribution;
pub use campaigns::CloseReason;
pub use commands::{AddInventoryCmd, CreateBuyCampaignCmd, CreateSellCampaignCmd};
pub use cooperatives::{Cooperative, CooperativeStatus};
pub use dissolutions::{DissolutionRequest, DissolutionStatus};
pub use error::EngineError;
pub use inventory::{InventoryItem, ProductType};
pub use inventory_contributions::InventoryContribution;
pub use ledger::{EntryKind, LedgerEntry};
pub use members::{Member, MemberRole};
pub use money::{Money, proportional_share};
pub use ops::{Engine, EngineBuilder, SweepReport};
pub use sell_campaigns::{SellCampaign, SellStatus};
pub use sell_contributions::SellContribution;
pub use transfers::{TransferRequest, TransferStatus};

pub mod buy_campaigns;
pub mod buy_contributions;
mod campaigns;
mod commands;
pub mod cooperatives;
pub mod dissolutions;
mod error;
pub mod inventory;
pub mod inventory_contributions;
pub mod ledger;
pub mod members;
mod money;
mod ops;
pub mod sell_campaigns;
pub mod sell_contributions;
pub mod transfers;
pub mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
