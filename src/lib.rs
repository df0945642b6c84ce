pub mod adjustments;
pub mod calculations;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod plan;
pub mod rates;
pub mod report;
pub mod team;
pub mod tow;
pub mod validation;

pub use adjustments::{AdjustmentPeriod, VolumeAdjustments};
pub use calculations::governance::{GovernanceConfig, GovernanceMode};
pub use calculations::{PlanCostSummary, compute_plan};
pub use plan::{BidPlan, PlanMetadata, PlanParams};
pub use rates::{MixEntry, ProfileMappings, RateCard, RateMappingPeriod, ResourceProfile};
pub use team::TeamMember;
pub use tow::{Tow, TowKind};
