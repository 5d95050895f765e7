//! Selection notifications for the embedding page and fire-and-forget analytics events.
//!
//! Nothing in here reports failure to the caller: problems are logged and the interaction carries
//! on.

mod parent;
mod sender;

pub use parent::{
  ChannelParentFrame, NoParentFrame, NotifyError, ParentFrame, ParentMessage, ProviderId,
  SELECTION_MESSAGE_TYPE, SelectionPayload,
};
pub use sender::{
  BeaconSender, BestEffortSender, DeliveryError, DeliveryStrategy, HttpSink, RequestSender,
  SurfSink,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{Category, LocationRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  /// First interaction with a record.
  PinClick,
  /// The user asked for the contact details.
  CoordClick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingPayload {
  pub event_type: EventKind,
  pub code_ohme_id: String,
  pub code_mcf: u32,
  pub nom_complet: String,
  pub type_structure: Category,
  pub timestamp: DateTime<Utc>,
}

impl TrackingPayload {
  /// `None` for records without an external id.
  #[must_use]
  pub fn new(record: &LocationRecord, kind: EventKind, timestamp: DateTime<Utc>) -> Option<Self> {
    Some(Self {
      event_type: kind,
      code_ohme_id: record.external_id()?.to_string(),
      code_mcf: record.code,
      nom_complet: record.trimmed_name().to_string(),
      type_structure: record.category(),
      timestamp,
    })
  }
}

pub struct Tracker {
  parent: Box<dyn ParentFrame>,
  parent_origin: String,
  sender: BestEffortSender,
}

impl Tracker {
  #[must_use]
  pub fn new(parent: Box<dyn ParentFrame>, parent_origin: &str, sender: BestEffortSender) -> Self {
    Self {
      parent,
      parent_origin: parent_origin.to_string(),
      sender,
    }
  }

  /// Tells the embedding page which provider was selected.
  pub fn notify_selection(&self, record: &LocationRecord) {
    let message = ParentMessage::selection(record);
    if let Err(e) = self.parent.post_message(&message, &self.parent_origin) {
      log::warn!("postMessage: {e}");
    }
  }

  /// Sends an analytics event. Records without an external id are not tracked.
  pub fn track_event(&self, record: &LocationRecord, kind: EventKind) {
    let Some(payload) = TrackingPayload::new(record, kind, Utc::now()) else {
      log::warn!("code_ohme_id manquant pour {}", record.trimmed_name());
      return;
    };
    self.sender.send(&payload);
  }

  pub fn track_pin_click(&self, record: &LocationRecord) {
    self.track_event(record, EventKind::PinClick);
    self.notify_selection(record);
  }

  pub fn track_coord_click(&self, record: &LocationRecord) {
    self.track_event(record, EventKind::CoordClick);
    self.notify_selection(record);
  }
}
