pub mod catalog;
pub mod domain;
pub mod flow;
pub mod ports;

pub use domain::{AuthSession, BookSelections, Genre, NewReaction, Reaction, User, UserCredentials};
pub use ports::{DatabaseService, PortError, PortResult, RecommendationRequest, RecommendationService};
