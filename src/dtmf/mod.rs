pub mod dtmf_config;
pub mod dtmf_digit;
pub mod dtmf_error;
pub mod dtmf_event;
pub mod dtmf_receiver;
pub mod dtmf_sender;
pub mod telephone_event;

pub use dtmf_config::DtmfConfig;
pub use dtmf_error::DtmfError;
pub use dtmf_event::{DtmfEvent, DtmfObserver};
pub use dtmf_receiver::DtmfReceiver;
pub use dtmf_sender::{DtmfPacket, DtmfSender};
pub use telephone_event::TelephoneEvent;
