use std::borrow::Cow;

/// Keeps the valid UTF-8 runs of `raw` and drops every byte sequence that is
/// not valid UTF-8. Characters the client actually sent, U+FFFD included,
/// survive untouched.
pub fn to_valid_text(raw: &[u8]) -> String {
    let mut text = String::with_capacity(raw.len());
    for chunk in raw.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Percent-encodes a key for use as the last path segment of a short URL.
/// Spaces become `%20`, never `+`, so the path decodes back to the key.
pub fn escape_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

/// Percent-decodes a raw path segment, leaving a literal `+` alone
pub fn decode_path_segment(segment: &str) -> Vec<u8> {
    urlencoding::decode_binary(segment.as_bytes()).into_owned()
}

/// Raw bytes of the first `name` field of an `application/x-www-form-urlencoded`
/// body. Missing fields come back empty.
pub fn form_value(body: &[u8], name: &str) -> Vec<u8> {
    body.split(|b| *b == b'&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, |b| *b == b'=');
            let field = decode_form_component(parts.next()?);
            (field.as_ref() == name.as_bytes())
                .then(|| decode_form_component(parts.next().unwrap_or_default()).into_owned())
        })
        .next()
        .unwrap_or_default()
}

fn decode_form_component(raw: &[u8]) -> Cow<'_, [u8]> {
    if raw.contains(&b'+') {
        let spaced: Vec<u8> = raw
            .iter()
            .map(|b| if *b == b'+' { b' ' } else { *b })
            .collect();
        Cow::Owned(urlencoding::decode_binary(&spaced).into_owned())
    } else {
        urlencoding::decode_binary(raw)
    }
}
