//! Helpers for object-store backends.

use crate::backend::ByteStream;
use bytes::BytesMut;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is in a `CopySource` key
const KEY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Regroups `stream` into chunks of exactly `part_size` bytes, except the last.
///
/// At most one part is buffered at a time. A source error is yielded once and
/// ends the stream.
pub(crate) fn into_parts(stream: ByteStream, part_size: usize) -> ByteStream {
    futures::stream::unfold(
        (stream, BytesMut::new(), false),
        move |(mut stream, mut buffer, mut finished)| async move {
            while !finished && buffer.len() < part_size {
                match stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => return Some((Err(e), (stream, BytesMut::new(), true))),
                    None => finished = true,
                }
            }

            if buffer.is_empty() {
                return None;
            }

            let part = buffer.split_to(buffer.len().min(part_size)).freeze();
            Some((Ok(part), (stream, buffer, finished)))
        },
    )
    .boxed()
}

/// `bucket/key` with the key URL-encoded, as `CopyObject` expects
pub(crate) fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, utf8_percent_encode(key, KEY))
}
