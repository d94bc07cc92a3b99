/*!
 * Translation helpers layered on top of the providers.
 *
 * - `codec`: pack title and content into one request and split the result
 */

pub use self::codec::{CertTranslation, DEFAULT_DELIMITER, cert_translate, pack, unpack};

pub mod codec;
