/*! Onion skins

Every message travelling through shroud is a chain of skins. Each skin starts
with a 4-byte magic, its fields follow. A `Crypt` skin encrypts everything
after it, so a relay sees only the skins up to the first `Crypt` it can't open.
*/

#[cfg(test)]
mod arbitrary;
mod balance;
mod confirmation;
mod crypt;
mod end;
mod errors;
mod exit;
mod forward;
mod get_balance;
mod intro;
mod message;
mod ready;
mod reply;
mod response;
mod reverse;
mod route;
mod session;

pub use self::balance::*;
pub use self::confirmation::*;
pub use self::crypt::*;
pub use self::end::*;
pub use self::errors::*;
pub use self::exit::*;
pub use self::forward::*;
pub use self::get_balance::*;
pub use self::intro::*;
pub use self::message::*;
pub use self::ready::*;
pub use self::reply::*;
pub use self::response::*;
pub use self::reverse::*;
pub use self::route::*;
pub use self::session::*;

use shroud_binary_io::*;

use crate::magic::{Magic, Registry, SkinKind};

/** One layer of an onion.
*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Skin {
    /// [`Forward`](./struct.Forward.html) structure.
    Forward(Forward),
    /// [`Reverse`](./struct.Reverse.html) structure.
    Reverse(Reverse),
    /// [`Crypt`](./struct.Crypt.html) structure.
    Crypt(Crypt),
    /// [`Session`](./struct.Session.html) structure.
    Session(Session),
    /// [`Exit`](./struct.Exit.html) structure.
    Exit(Exit),
    /// [`Response`](./struct.Response.html) structure.
    Response(Response),
    /// [`Confirmation`](./struct.Confirmation.html) structure.
    Confirmation(Confirmation),
    /// [`Message`](./struct.Message.html) structure.
    Message(Message),
    /// [`Ready`](./struct.Ready.html) structure.
    Ready(Ready),
    /// [`Route`](./struct.Route.html) structure.
    Route(Route),
    /// [`Intro`](./struct.Intro.html) structure.
    Intro(Intro),
    /// [`GetBalance`](./struct.GetBalance.html) structure.
    GetBalance(GetBalance),
    /// [`Balance`](./struct.Balance.html) structure.
    Balance(Balance),
    /// [`End`](./struct.End.html) structure.
    End(End),
}

impl SkinKind {
    /// Size of the fixed part of the skin including magic.
    pub fn min_len(self) -> usize {
        match self {
            SkinKind::Forward => FORWARD_SIZE,
            SkinKind::Reverse => REVERSE_SIZE,
            SkinKind::Crypt => CRYPT_SIZE,
            SkinKind::Session => SESSION_SIZE,
            SkinKind::Exit => EXIT_MIN_SIZE,
            SkinKind::Response => RESPONSE_MIN_SIZE,
            SkinKind::Confirmation => CONFIRMATION_SIZE,
            SkinKind::Message => MESSAGE_MIN_SIZE,
            SkinKind::Ready => READY_SIZE,
            SkinKind::Route => ROUTE_SIZE,
            SkinKind::Intro => INTRO_SIZE,
            SkinKind::GetBalance => GET_BALANCE_SIZE,
            SkinKind::Balance => BALANCE_SIZE,
            SkinKind::End => END_SIZE,
        }
    }

    /// Label used for splice annotations.
    pub fn label(self) -> &'static str {
        match self {
            SkinKind::Forward => "forward",
            SkinKind::Reverse => "reverse",
            SkinKind::Crypt => "crypt",
            SkinKind::Session => "session",
            SkinKind::Exit => "exit",
            SkinKind::Response => "response",
            SkinKind::Confirmation => "confirmation",
            SkinKind::Message => "message",
            SkinKind::Ready => "ready",
            SkinKind::Route => "route",
            SkinKind::Intro => "intro",
            SkinKind::GetBalance => "get_balance",
            SkinKind::Balance => "balance",
            SkinKind::End => "end",
        }
    }

    /** Decode skin of this kind at the cursor of `splice`.

    The fixed part of the skin is checked against the bytes left before
    anything is read, so a truncated skin fails with `TooShort` and the
    cursor stays where it was.
    */
    pub fn decode(self, splice: &mut Splice) -> Result<Skin, DecodeError> {
        let need = self.min_len();
        let have = splice.remaining();
        if have < need {
            return Err(DecodeError::TooShort { magic: self.magic(), need, have })
        }

        let label = self.label();
        let skin = match self {
            SkinKind::Forward => Skin::Forward(splice.read(label)?),
            SkinKind::Reverse => Skin::Reverse(splice.read(label)?),
            SkinKind::Crypt => Skin::Crypt(splice.read(label)?),
            SkinKind::Session => Skin::Session(splice.read(label)?),
            SkinKind::Exit => Skin::Exit(splice.read(label)?),
            SkinKind::Response => Skin::Response(splice.read(label)?),
            SkinKind::Confirmation => Skin::Confirmation(splice.read(label)?),
            SkinKind::Message => Skin::Message(splice.read(label)?),
            SkinKind::Ready => Skin::Ready(splice.read(label)?),
            SkinKind::Route => Skin::Route(splice.read(label)?),
            SkinKind::Intro => Skin::Intro(splice.read(label)?),
            SkinKind::GetBalance => Skin::GetBalance(splice.read(label)?),
            SkinKind::Balance => Skin::Balance(splice.read(label)?),
            SkinKind::End => Skin::End(splice.read(label)?),
        };
        Ok(skin)
    }
}

impl Skin {
    /// Kind of the skin.
    pub fn kind(&self) -> SkinKind {
        match self {
            Skin::Forward(_) => SkinKind::Forward,
            Skin::Reverse(_) => SkinKind::Reverse,
            Skin::Crypt(_) => SkinKind::Crypt,
            Skin::Session(_) => SkinKind::Session,
            Skin::Exit(_) => SkinKind::Exit,
            Skin::Response(_) => SkinKind::Response,
            Skin::Confirmation(_) => SkinKind::Confirmation,
            Skin::Message(_) => SkinKind::Message,
            Skin::Ready(_) => SkinKind::Ready,
            Skin::Route(_) => SkinKind::Route,
            Skin::Intro(_) => SkinKind::Intro,
            Skin::GetBalance(_) => SkinKind::GetBalance,
            Skin::Balance(_) => SkinKind::Balance,
            Skin::End(_) => SkinKind::End,
        }
    }

    /// Magic the skin starts with.
    pub fn magic(&self) -> Magic {
        self.kind().magic()
    }

    /// Serialized length of this skin alone.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let variable = match self {
            Skin::Exit(exit) => exit.payload.len(),
            Skin::Response(response) => response.payload.len(),
            Skin::Message(message) => message.payload.len(),
            _ => 0,
        };
        self.kind().min_len() + variable
    }

    /// Write the skin at the cursor of `splice`.
    pub fn encode(&self, splice: &mut Splice) -> Result<(), SpliceError> {
        let label = self.kind().label();
        match self {
            Skin::Forward(inner) => splice.write(label, inner),
            Skin::Reverse(inner) => splice.write(label, inner),
            Skin::Crypt(inner) => splice.write(label, inner),
            Skin::Session(inner) => splice.write(label, inner),
            Skin::Exit(inner) => splice.write(label, inner),
            Skin::Response(inner) => splice.write(label, inner),
            Skin::Confirmation(inner) => splice.write(label, inner),
            Skin::Message(inner) => splice.write(label, inner),
            Skin::Ready(inner) => splice.write(label, inner),
            Skin::Route(inner) => splice.write(label, inner),
            Skin::Intro(inner) => splice.write(label, inner),
            Skin::GetBalance(inner) => splice.write(label, inner),
            Skin::Balance(inner) => splice.write(label, inner),
            Skin::End(inner) => splice.write(label, inner),
        }?;
        Ok(())
    }

    /// Decode the skin at the cursor of `splice` using magics known to
    /// `registry`.
    pub fn decode(registry: &Registry, splice: &mut Splice) -> Result<Skin, DecodeError> {
        let magic = splice.peek::<Magic>()?;
        let kind = registry.get(&magic).ok_or(DecodeError::UnknownMagic { magic })?;
        kind.decode(splice)
    }
}

/** Chain of skins, outermost first, serialized into one buffer.

Every `Crypt` encrypts all bytes after it, so the region of an outer skin
contains the regions of all skins inside it.
*/
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Onion {
    /// Skins, outermost first
    pub skins: Vec<Skin>,
}

impl Onion {
    /// Create onion from skins ordered outermost first.
    pub fn assemble(skins: Vec<Skin>) -> Onion {
        Onion { skins }
    }

    /// Add `inner` as the innermost skin.
    pub fn wrap(&mut self, inner: Skin) -> &mut Self {
        self.skins.push(inner);
        self
    }

    /// Serialized length of all skins.
    pub fn len(&self) -> usize {
        self.skins.iter().map(Skin::len).sum()
    }

    /// Check if the onion has no skins.
    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }

    /** Serialize and encrypt the onion.

    Skins are written first, recording where every `Crypt` region starts.
    Then the crypts are applied innermost first so that every outer crypt
    encrypts already encrypted inner regions.
    */
    pub fn encode(&self) -> Result<Splice, EncodeError> {
        let mut splice = Splice::new(self.len());
        let mut crypts = Vec::new();
        for skin in &self.skins {
            skin.encode(&mut splice)?;
            if let Skin::Crypt(crypt) = skin {
                crypts.push((splice.cursor(), crypt));
            }
        }
        for (start, crypt) in crypts.into_iter().rev() {
            crypt.encipher_spans(&mut splice, start)?;
        }
        splice.set_cursor(0)?;
        Ok(splice)
    }

    /** Decode plaintext skins from the cursor of `splice`.

    Decoding stops after `End`, after a `Crypt` since everything behind it is
    encrypted, or when the buffer is exhausted.
    */
    pub fn decode(registry: &Registry, splice: &mut Splice) -> Result<Onion, DecodeError> {
        let mut skins = Vec::new();
        while splice.remaining() > 0 {
            let skin = Skin::decode(registry, splice)?;
            let stop = matches!(skin, Skin::End(_) | Skin::Crypt(_));
            skins.push(skin);
            if stop {
                break
            }
        }
        Ok(Onion { skins })
    }
}
