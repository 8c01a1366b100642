//! Best-effort UDP frame transport.
//!
//! One encoded camera frame goes in on the sending side, a burst of
//! MTU-safe datagrams crosses the wire, and the whole frame comes out on
//! the receiving side once its end-marker confirms the reassembly buffer
//! is complete. Delivery is not guaranteed and frames are not retransmitted;
//! a dropped frame is simply superseded by the next one.

pub mod layer;
pub mod protocol;
pub mod utils;

pub use layer::{
    AcceptAll, BindError, FrameValidator, PollError, Receiver, ReceiverBuilder, Sender,
    SenderBuilder, SocketState, TransmitError,
};
