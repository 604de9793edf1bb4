pub mod comment;
pub mod idea;
pub mod profile;
pub mod refresh_token;
pub mod reset_token;
pub mod vote;

pub use comment::{Entity as Comment, Model as CommentModel};
pub use idea::{Entity as Idea, Model as IdeaModel};
pub use profile::{Entity as Profile, Model as ProfileModel};
pub use refresh_token::Entity as RefreshToken;
pub use reset_token::{Entity as ResetToken, Model as ResetTokenModel};
pub use vote::{Entity as Vote, Model as VoteModel, VoteKind};
