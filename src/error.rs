//! Error taxonomy for the reanimation engine.
//!
//! Errors fall in three families:
//!
//! - **not found**: a name, frame or entity the caller asked for does not
//!   exist. Playback state is left untouched.
//! - **validation**: a manual override refers to something invalid. The
//!   whole request is rejected, nothing is partially applied.
//! - **load**: a definition document could not be read or parsed.
//!
//! Missing image handles and all-hidden windows are not errors: the
//! assembler recovers from them locally (see [`crate::reanim::render`]).

use bevy_ecs::prelude::Entity;
use thiserror::Error;

/// Errors surfaced by the reanimation engine.
#[derive(Error, Debug)]
pub enum ReanimError {
    /// The definition has no animation with this name.
    #[error("animation '{0}' not found")]
    AnimationNotFound(String),

    /// The logical frame lies past the end of the animation's window.
    #[error("logical frame {frame} is outside the window of '{animation}'")]
    FrameNotFound { animation: String, frame: usize },

    /// No definition is registered under this key.
    #[error("definition '{0}' is not loaded")]
    DefinitionNotFound(String),

    /// The entity does not carry a `Reanimation` component.
    #[error("entity {0:?} has no reanimation")]
    MissingReanimation(Entity),

    /// A track name the definition does not have, from a binding override,
    /// image override, hidden-track toggle or attachment.
    #[error("unknown track '{0}'")]
    UnknownTrack(String),

    /// A binding override names an animation the definition does not have.
    #[error("binding override references unknown animation '{0}'")]
    UnknownAnimation(String),

    /// A binding override names an animation that is not playing.
    #[error("binding override references inactive animation '{0}'")]
    InactiveAnimation(String),

    /// The definition document could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The definition document is not valid JSON for the reanim schema.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The definition has no tracks or no frames.
    #[error("definition has no frames")]
    EmptyDefinition,
}

impl ReanimError {
    /// True for the not-found family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReanimError::AnimationNotFound(_)
                | ReanimError::FrameNotFound { .. }
                | ReanimError::DefinitionNotFound(_)
                | ReanimError::MissingReanimation(_)
        )
    }

    /// True for the validation family.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReanimError::UnknownTrack(_)
                | ReanimError::UnknownAnimation(_)
                | ReanimError::InactiveAnimation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReanimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert!(ReanimError::AnimationNotFound("walk".into()).is_not_found());
        assert!(
            ReanimError::FrameNotFound {
                animation: "walk".into(),
                frame: 9
            }
            .is_not_found()
        );
        assert!(!ReanimError::UnknownTrack("arm".into()).is_not_found());
    }

    #[test]
    fn test_validation_family() {
        assert!(ReanimError::UnknownTrack("arm".into()).is_validation());
        assert!(ReanimError::InactiveAnimation("idle".into()).is_validation());
        assert!(!ReanimError::EmptyDefinition.is_validation());
    }

    #[test]
    fn test_display_names_the_animation() {
        let err = ReanimError::AnimationNotFound("nonexistent".into());
        assert_eq!(err.to_string(), "animation 'nonexistent' not found");
    }

    #[test]
    fn test_display_unknown_track() {
        let err = ReanimError::UnknownTrack("tail".into());
        assert_eq!(err.to_string(), "unknown track 'tail'");
    }
}
