// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifications and the closed set of protocol messages

use crate::statement::{Capability, ResultStatement, Specification, Statement};
use std::fmt;

/// "Accepted, not finished yet": a copy of the specification
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    statement: Statement,
}

impl Receipt {
    pub fn new(specification: &Specification) -> Self {
        let mut statement = specification.statement().clone();
        statement.set_token(specification.token());
        Self { statement }
    }

    pub(crate) fn from_statement(statement: Statement) -> Self {
        Self { statement }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn token(&self) -> String {
        self.statement.token()
    }

    pub fn verb(&self) -> &str {
        self.statement.verb()
    }

    /// Ask for whatever the component now has for this receipt
    pub fn redemption(&self) -> Redemption {
        Redemption::new(self.verb(), self.token())
    }

    pub fn interrupt(&self) -> Interrupt {
        Interrupt::new(self.verb(), self.token())
    }
}

/// A capability is no longer offered
#[derive(Debug, Clone, PartialEq)]
pub struct Withdrawal {
    statement: Statement,
}

impl Withdrawal {
    pub fn new(capability: &Capability) -> Self {
        let mut statement = capability.statement().clone();
        statement.set_token(capability.token());
        Self { statement }
    }

    pub(crate) fn from_statement(statement: Statement) -> Self {
        Self { statement }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn token(&self) -> String {
        self.statement.token()
    }
}

/// Token-only request for a prior receipt's outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    verb: String,
    token: String,
}

impl Redemption {
    pub fn new(verb: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            token: token.into(),
        }
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Request to stop a running specification early
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interrupt {
    verb: String,
    token: String,
}

impl Interrupt {
    pub fn new(verb: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            token: token.into(),
        }
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Failure report sent to the other party
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    token: Option<String>,
    message: String,
}

impl Exception {
    pub fn new(token: Option<String>, message: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }

    pub fn for_token(token: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Some(token.into()), message)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(f, "{}: {}", token, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// What an envelope carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    Message,
    Statement,
    Notification,
}

impl EnvelopeKind {
    pub fn name(&self) -> &'static str {
        match self {
            EnvelopeKind::Message => "message",
            EnvelopeKind::Statement => "statement",
            EnvelopeKind::Notification => "notification",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "message" => Some(EnvelopeKind::Message),
            "statement" => Some(EnvelopeKind::Statement),
            "notification" => Some(EnvelopeKind::Notification),
            _ => None,
        }
    }
}

/// An ordered batch of messages
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    kind: EnvelopeKind,
    contents: Vec<Message>,
}

impl Envelope {
    pub fn new(kind: EnvelopeKind) -> Self {
        Self {
            kind,
            contents: Vec::new(),
        }
    }

    pub fn with_contents(kind: EnvelopeKind, contents: Vec<Message>) -> Self {
        Self { kind, contents }
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    pub fn push(&mut self, message: Message) {
        self.contents.push(message);
    }

    pub fn contents(&self) -> &[Message] {
        &self.contents
    }

    pub fn into_contents(self) -> Vec<Message> {
        self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Every message that can cross the wire
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Capability(Capability),
    Specification(Specification),
    Result(ResultStatement),
    Receipt(Receipt),
    Redemption(Redemption),
    Withdrawal(Withdrawal),
    Interrupt(Interrupt),
    Exception(Exception),
    Envelope(Envelope),
}

impl Message {
    /// Wire discriminator key
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Capability(_) => "capability",
            Message::Specification(_) => "specification",
            Message::Result(_) => "result",
            Message::Receipt(_) => "receipt",
            Message::Redemption(_) => "redemption",
            Message::Withdrawal(_) => "withdrawal",
            Message::Interrupt(_) => "interrupt",
            Message::Exception(_) => "exception",
            Message::Envelope(_) => "envelope",
        }
    }

    pub fn token(&self) -> Option<String> {
        match self {
            Message::Capability(s) => Some(s.token()),
            Message::Specification(s) => Some(s.token()),
            Message::Result(s) => Some(s.token()),
            Message::Receipt(r) => Some(r.token()),
            Message::Redemption(r) => Some(r.token().to_string()),
            Message::Withdrawal(w) => Some(w.token()),
            Message::Interrupt(i) => Some(i.token().to_string()),
            Message::Exception(e) => e.token().map(str::to_string),
            Message::Envelope(_) => None,
        }
    }
}

impl From<Capability> for Message {
    fn from(c: Capability) -> Self {
        Message::Capability(c)
    }
}

impl From<Specification> for Message {
    fn from(s: Specification) -> Self {
        Message::Specification(s)
    }
}

impl From<ResultStatement> for Message {
    fn from(r: ResultStatement) -> Self {
        Message::Result(r)
    }
}

impl From<Receipt> for Message {
    fn from(r: Receipt) -> Self {
        Message::Receipt(r)
    }
}

impl From<Redemption> for Message {
    fn from(r: Redemption) -> Self {
        Message::Redemption(r)
    }
}

impl From<Withdrawal> for Message {
    fn from(w: Withdrawal) -> Self {
        Message::Withdrawal(w)
    }
}

impl From<Interrupt> for Message {
    fn from(i: Interrupt) -> Self {
        Message::Interrupt(i)
    }
}

impl From<Exception> for Message {
    fn from(e: Exception) -> Self {
        Message::Exception(e)
    }
}

impl From<Envelope> for Message {
    fn from(e: Envelope) -> Self {
        Message::Envelope(e)
    }
}
