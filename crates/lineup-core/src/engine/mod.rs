// Roster matching and team balancing engine.

pub mod attendance;
pub mod matcher;
pub mod normalize;
pub mod partition;
pub mod provision;

pub use attendance::{extract_candidate_names, parse_attendance_input, AttendanceBuffer};
pub use matcher::{resolve, Resolution};
pub use normalize::normalize;
pub use partition::{partition, BalanceParams, TeamPair};
pub use provision::{provision, ProvisionDefaults};
