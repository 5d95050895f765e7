use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::LocationRecord;

pub const SELECTION_MESSAGE_TYPE: &str = "MCF_MONITEUR_SELECTED";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
  #[error("not embedded in a parent frame")]
  Detached,
  #[error("parent frame is gone")]
  Disconnected,
}

/// The external identity when linked, the internal code otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderId {
  External(String),
  Code(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPayload {
  pub moniteur_id: ProviderId,
  pub code_mcf: u32,
  pub nom_complet: String,
}

/// `{type: "MCF_MONITEUR_SELECTED", payload: {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentMessage {
  #[serde(rename = "type")]
  pub kind: String,
  pub payload: SelectionPayload,
}

impl ParentMessage {
  #[must_use]
  pub fn selection(record: &LocationRecord) -> Self {
    let moniteur_id = record
      .external_id()
      .map_or(ProviderId::Code(record.code), |id| {
        ProviderId::External(id.to_string())
      });
    Self {
      kind: SELECTION_MESSAGE_TYPE.to_string(),
      payload: SelectionPayload {
        moniteur_id,
        code_mcf: record.code,
        nom_complet: record.trimmed_name().to_string(),
      },
    }
  }
}

/// The page embedding the map.
pub trait ParentFrame: Send {
  /// Posts `message`, to be read only by a window of `target_origin`.
  ///
  /// # Errors
  /// Fails when there is no parent to receive it.
  fn post_message(&self, message: &ParentMessage, target_origin: &str) -> Result<(), NotifyError>;
}

/// Used when the map is not embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParentFrame;

impl ParentFrame for NoParentFrame {
  fn post_message(&self, _message: &ParentMessage, _target_origin: &str) -> Result<(), NotifyError> {
    Err(NotifyError::Detached)
  }
}

/// Forwards messages and their target origin over a channel.
#[derive(Debug, Clone)]
pub struct ChannelParentFrame {
  sender: Sender<(String, ParentMessage)>,
}

impl ChannelParentFrame {
  #[must_use]
  pub fn new(sender: Sender<(String, ParentMessage)>) -> Self {
    Self { sender }
  }
}

impl ParentFrame for ChannelParentFrame {
  fn post_message(&self, message: &ParentMessage, target_origin: &str) -> Result<(), NotifyError> {
    self
      .sender
      .send((target_origin.to_string(), message.clone()))
      .map_err(|_| NotifyError::Disconnected)
  }
}
