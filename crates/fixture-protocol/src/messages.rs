//! Message envelopes
//!
//! Every message is `{type, payload}` with camelCase fields. Commands flow
//! from the control surface to the sandbox; events flow back.

use crate::error::ProtocolError;
use fixture_state::{FixturePath, FixtureState, FixtureStateChange, RendererId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command type tags
pub const COMMAND_TYPES: [&str; 4] = [
    "selectFixture",
    "unselectFixture",
    "setFixtureState",
    "requestFixtureList",
];

/// Event type tags
pub const EVENT_TYPES: [&str; 2] = ["fixtureList", "fixtureState"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFixturePayload {
    pub renderer_id: RendererId,
    pub fixture_path: FixturePath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnselectFixturePayload {
    pub renderer_id: RendererId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFixtureStatePayload {
    pub renderer_id: RendererId,
    pub fixture_path: FixturePath,
    pub fixture_state_change: FixtureStateChange,
}

/// Control surface → sandbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Command {
    SelectFixture(SelectFixturePayload),
    UnselectFixture(UnselectFixturePayload),
    SetFixtureState(SetFixtureStatePayload),
    RequestFixtureList,
}

impl Command {
    /// Decode a command envelope
    ///
    /// # Errors
    /// - `ProtocolError::MissingType` without a string `type`
    /// - `ProtocolError::UnknownType` for tags that are not commands
    /// - `ProtocolError::Malformed` if the payload does not fit the tag
    pub fn parse(message: Value) -> Result<Self, ProtocolError> {
        check_type(&message, &COMMAND_TYPES)?;
        Ok(serde_json::from_value(message)?)
    }

    /// Wire tag of this command
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Command::SelectFixture(_) => COMMAND_TYPES[0],
            Command::UnselectFixture(_) => COMMAND_TYPES[1],
            Command::SetFixtureState(_) => COMMAND_TYPES[2],
            Command::RequestFixtureList => COMMAND_TYPES[3],
        }
    }

    /// Addressed renderer, if the command is addressed at all
    #[must_use]
    pub fn renderer_id(&self) -> Option<&RendererId> {
        match self {
            Command::SelectFixture(payload) => Some(&payload.renderer_id),
            Command::UnselectFixture(payload) => Some(&payload.renderer_id),
            Command::SetFixtureState(payload) => Some(&payload.renderer_id),
            Command::RequestFixtureList => None,
        }
    }

    /// Encode as a wire value
    ///
    /// # Errors
    /// `ProtocolError::Malformed` if serialization fails
    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureListPayload {
    pub renderer_id: RendererId,
    pub fixtures: Vec<FixturePath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureStatePayload {
    pub renderer_id: RendererId,
    pub fixture_path: FixturePath,
    pub fixture_state: FixtureState,
}

/// Sandbox → control surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    FixtureList(FixtureListPayload),
    FixtureState(FixtureStatePayload),
}

impl Event {
    /// Decode an event envelope
    ///
    /// # Errors
    /// Same as [`Command::parse`], against the event tags
    pub fn parse(message: Value) -> Result<Self, ProtocolError> {
        check_type(&message, &EVENT_TYPES)?;
        Ok(serde_json::from_value(message)?)
    }

    /// Encode as a wire value
    ///
    /// # Errors
    /// `ProtocolError::Malformed` if serialization fails
    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Borrow the fixture state payload, if this is a state event
    #[must_use]
    pub fn as_fixture_state(&self) -> Option<&FixtureStatePayload> {
        match self {
            Event::FixtureState(payload) => Some(payload),
            Event::FixtureList(_) => None,
        }
    }
}

fn check_type(message: &Value, known: &[&str]) -> Result<(), ProtocolError> {
    let tag = message
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?;
    if known.contains(&tag) {
        Ok(())
    } else {
        Err(ProtocolError::UnknownType(tag.to_string()))
    }
}
