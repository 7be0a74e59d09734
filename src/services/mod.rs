// Business logic over the database and external transports

pub mod assessment_service;
pub mod booking_service;
pub mod document_service;
pub mod email_service;
pub mod evaluation_service;
pub mod export_service;
pub mod import_service;
pub mod pathway_service;
pub mod player_service;
pub mod reminder_scheduler;
pub mod suggestion_service;
pub mod team_service;
pub mod tryout_service;
pub mod user_service;

pub use assessment_service::*;
pub use booking_service::*;
pub use document_service::*;
pub use email_service::*;
pub use evaluation_service::*;
pub use export_service::*;
pub use import_service::*;
pub use pathway_service::*;
pub use player_service::*;
pub use reminder_scheduler::*;
pub use suggestion_service::*;
pub use team_service::*;
pub use tryout_service::*;
pub use user_service::*;
