/*! Magic tags and the registry mapping them to skin kinds.
*/

use std::collections::HashMap;

use thiserror::Error;

use shroud_binary_io::Splice;

/// Size of a magic tag.
pub const MAGIC_SIZE: usize = 4;

/// 4-byte ASCII tag that starts every skin.
pub type Magic = [u8; MAGIC_SIZE];

/// Magic of [`Forward`](crate::onion::Forward).
pub const FORWARD: Magic = *b"fwrd";
/// Magic of [`Reverse`](crate::onion::Reverse).
pub const REVERSE: Magic = *b"rvrs";
/// Magic of [`Crypt`](crate::onion::Crypt).
pub const CRYPT: Magic = *b"cryp";
/// Magic of [`Session`](crate::onion::Session).
pub const SESSION: Magic = *b"sesn";
/// Magic of [`Exit`](crate::onion::Exit).
pub const EXIT: Magic = *b"exit";
/// Magic of [`Response`](crate::onion::Response).
pub const RESPONSE: Magic = *b"resp";
/// Magic of [`Confirmation`](crate::onion::Confirmation).
pub const CONFIRMATION: Magic = *b"conf";
/// Magic of [`Message`](crate::onion::Message).
pub const MESSAGE: Magic = *b"mesg";
/// Magic of [`Ready`](crate::onion::Ready).
pub const READY: Magic = *b"redy";
/// Magic of [`Route`](crate::onion::Route).
pub const ROUTE: Magic = *b"rout";
/// Magic of [`Intro`](crate::onion::Intro).
pub const INTRO: Magic = *b"intr";
/// Magic of [`GetBalance`](crate::onion::GetBalance).
pub const GET_BALANCE: Magic = *b"gbal";
/// Magic of [`Balance`](crate::onion::Balance).
pub const BALANCE: Magic = *b"bala";
/// Magic of [`End`](crate::onion::End).
pub const END: Magic = *b"end!";

/// Kind of a skin, known before the skin body is decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SkinKind {
    /// Relay the rest of the message to an address.
    Forward,
    /// Return path segment.
    Reverse,
    /// Encrypted remainder.
    Crypt,
    /// Session key provisioning.
    Session,
    /// Request leaving the onion network.
    Exit,
    /// Reply of an exit service.
    Response,
    /// Delivery confirmation.
    Confirmation,
    /// Message to a hidden service.
    Message,
    /// Hidden service is ready to receive.
    Ready,
    /// Route request to a hidden service.
    Route,
    /// Hidden service introduction.
    Intro,
    /// Balance query.
    GetBalance,
    /// Balance report.
    Balance,
    /// Terminator of a chain.
    End,
}

impl SkinKind {
    /// Every built-in kind.
    pub const ALL: [SkinKind; 14] = [
        SkinKind::Forward,
        SkinKind::Reverse,
        SkinKind::Crypt,
        SkinKind::Session,
        SkinKind::Exit,
        SkinKind::Response,
        SkinKind::Confirmation,
        SkinKind::Message,
        SkinKind::Ready,
        SkinKind::Route,
        SkinKind::Intro,
        SkinKind::GetBalance,
        SkinKind::Balance,
        SkinKind::End,
    ];

    /// Magic this kind is written with.
    pub fn magic(self) -> Magic {
        match self {
            SkinKind::Forward => FORWARD,
            SkinKind::Reverse => REVERSE,
            SkinKind::Crypt => CRYPT,
            SkinKind::Session => SESSION,
            SkinKind::Exit => EXIT,
            SkinKind::Response => RESPONSE,
            SkinKind::Confirmation => CONFIRMATION,
            SkinKind::Message => MESSAGE,
            SkinKind::Ready => READY,
            SkinKind::Route => ROUTE,
            SkinKind::Intro => INTRO,
            SkinKind::GetBalance => GET_BALANCE,
            SkinKind::Balance => BALANCE,
            SkinKind::End => END,
        }
    }
}

/// Error that can happen when registering a magic.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RegistryError {
    /// Magic is already registered.
    #[error("Magic {magic:?} is already registered for {existing:?}")]
    Duplicate {
        /// Registered magic.
        magic: Magic,
        /// Kind the magic is registered for.
        existing: SkinKind,
    },
}

/** Table of known magics.

Built once at startup and then shared read-only between handlers.
*/
#[derive(Clone, Debug, Default)]
pub struct Registry {
    kinds: HashMap<Magic, SkinKind>,
}

impl Registry {
    /// Create empty registry.
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Create registry with every built-in skin.
    pub fn with_skins() -> Registry {
        let kinds = SkinKind::ALL.iter()
            .map(|kind| (kind.magic(), *kind))
            .collect();
        Registry { kinds }
    }

    /// Register `kind` under `magic`. Magic can be registered only once.
    pub fn register(&mut self, magic: Magic, kind: SkinKind) -> Result<(), RegistryError> {
        if let Some(&existing) = self.kinds.get(&magic) {
            return Err(RegistryError::Duplicate { magic, existing })
        }
        self.kinds.insert(magic, kind);
        Ok(())
    }

    /// Kind registered for `magic`.
    pub fn get(&self, magic: &Magic) -> Option<SkinKind> {
        self.kinds.get(magic).copied()
    }

    /// Peek magic at the cursor of `splice` and return its kind. The cursor
    /// is not moved.
    pub fn recognise(&self, splice: &Splice) -> Option<SkinKind> {
        let magic = splice.peek::<Magic>().ok()?;
        self.get(&magic)
    }

    /// Number of registered magics.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Check if no magic is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
