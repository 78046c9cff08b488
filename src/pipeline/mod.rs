//! Stages of the base64 image transcoder.
//!
//! Each submodule implements exactly one concern and is independently
//! testable. Leaf stages come first; the container passes build on them.
//!
//! ## Data Flow
//!
//! ```text
//! URL ──▶ input ──┐
//! image file ─────┴──▶ transcode::encode ──▶ name.raw.b64 + name.mime.b64
//! sidecar ───────────▶ transcode::decode ──▶ sniff ──▶ name.<ext>
//! JSON ──▶ json ──┐
//! text ──▶ text ──┴──▶ save (codec + naming) ──▶ decoded/<name>
//! ```
//!
//! 1. [`sniff`]    : magic-byte image detection
//! 2. [`naming`]   : extensions, MIME types, unique and numbered file names
//! 3. [`codec`]    : standard-alphabet base64
//! 4. [`save`]     : decode one embedded payload to a file, return its reference
//! 5. [`text`]     : Markdown images and bare data-URLs in free text
//! 6. [`json`]     : `mime_type`/`data` pairs and data-URL strings in a JSON tree
//! 7. [`transcode`]: image file ⇄ sidecar files
//! 8. [`input`]    : download a URL and persist the image locally

pub mod codec;
pub mod input;
pub mod json;
pub mod naming;
pub mod save;
pub mod sniff;
pub mod text;
pub mod transcode;
