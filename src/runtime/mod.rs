//! Wire runtime shared by generated code and the interpretive codecs.
//!
//! Generated servers and clients depend on the typed helpers ([`wire`],
//! [`ResponseBuilder`], [`WireValue`]); the CLI and tests drive
//! [`decode_request`], [`build_request`], [`encode_result`],
//! [`encode_error`] and [`decode_response`] directly from resolved bindings.

mod encoding;
mod error;
mod format;
mod request;
mod response;
mod validate;
mod value;
pub mod wire;

pub use encoding::{Encoder, EncoderSet, JsonEncoder, XmlEncoder, YamlEncoder, JSON, XML, YAML};
pub use error::{
    BuildError, DecodeError, DefaultErrorFormatter, EncodeError, ErrorFormatter, ErrorValue,
    FormattedError, GenericError, ERROR_NAME_HEADER,
};
pub use format::{
    escape, format_path_value, format_scalar, parse_scalar, path_list, path_segment, unescape,
    Bytes, WireValue,
};
pub use request::{build_path, build_request, decode_request};
pub use response::{
    accept_header, decode_response, encode_error, encode_generic_error, encode_result,
    response_encoder, select_response, ResponseBuilder,
};
pub use validate::{check_enum, check_length, check_pattern, check_range, field_path, validate};
pub use value::TypedValue;
pub use wire::RequestBuilder;

/// Path captures handed to decoders.
pub use crate::router::ParamVec as PathParams;
pub use crate::router::MountRecord;
