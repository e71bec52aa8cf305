//! Text encodings, digests and JWT helpers

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use data_encoding::{BASE32, BASE32HEX, BASE32HEX_NOPAD, BASE32_NOPAD, HEXLOWER, HEXUPPER};
use hmac::{Hmac, Mac};
use indexmap::IndexMap;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};

use crate::error::{Error, ErrorKind, Result};
use crate::json;
use crate::value::Value;

const BASE91_ALPHABET: &[u8; 91] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!#$%&()*+,./:;<=>?@[]^_`{|}~\"";

/// Render `text` in every supported encoding, keyed by encoding id
pub fn encode_content(text: &str) -> IndexMap<String, String> {
    let bytes = text.as_bytes();
    let mut out = IndexMap::new();
    out.insert("base32".to_string(), BASE32.encode(bytes));
    out.insert("base32_nopad".to_string(), BASE32_NOPAD.encode(bytes));
    out.insert("base32hex".to_string(), BASE32HEX.encode(bytes));
    out.insert("base32hex_nopad".to_string(), BASE32HEX_NOPAD.encode(bytes));
    out.insert("base64".to_string(), STANDARD.encode(bytes));
    out.insert("base64_raw".to_string(), STANDARD_NO_PAD.encode(bytes));
    out.insert("base64url".to_string(), URL_SAFE.encode(bytes));
    out.insert("base64url_raw".to_string(), URL_SAFE_NO_PAD.encode(bytes));
    out.insert("ascii85".to_string(), ascii85_encode(bytes));
    out.insert("base91".to_string(), base91_encode(bytes));
    out.insert("hex".to_string(), HEXLOWER.encode(bytes));
    out.insert("hex_upper".to_string(), HEXUPPER.encode(bytes));
    out
}

/// Reverse a single encoding by id
pub fn decode_content(kind: &str, text: &str) -> Result<String> {
    let text = text.trim();
    let bytes = match kind {
        "base32" => BASE32.decode(text.as_bytes()).map_err(invalid)?,
        "base32_nopad" => BASE32_NOPAD.decode(text.as_bytes()).map_err(invalid)?,
        "base32hex" => BASE32HEX.decode(text.as_bytes()).map_err(invalid)?,
        "base32hex_nopad" => BASE32HEX_NOPAD.decode(text.as_bytes()).map_err(invalid)?,
        "base64" => STANDARD.decode(text).map_err(invalid)?,
        "base64_raw" => STANDARD_NO_PAD.decode(text).map_err(invalid)?,
        "base64url" => URL_SAFE.decode(text).map_err(invalid)?,
        "base64url_raw" => URL_SAFE_NO_PAD.decode(text).map_err(invalid)?,
        "ascii85" => ascii85_decode(text)?,
        "base91" => base91_decode(text),
        "hex" => HEXLOWER.decode(text.as_bytes()).map_err(invalid)?,
        "hex_upper" => HEXUPPER.decode(text.as_bytes()).map_err(invalid)?,
        other => return Err(Error::unsupported_format(other)),
    };
    String::from_utf8(bytes).map_err(invalid)
}

fn invalid<E>(_: E) -> Error {
    Error::semantic(ErrorKind::InvalidEncoding)
}

fn ascii85_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 5 / 4 + 5);
    for chunk in bytes.chunks(4) {
        let mut group = [0u8; 4];
        if let Some(slot) = group.get_mut(..chunk.len()) {
            slot.copy_from_slice(chunk);
        }
        let mut word = u32::from_be_bytes(group);
        if word == 0 && chunk.len() == 4 {
            out.push('z');
            continue;
        }
        let mut digits = [0u8; 5];
        for slot in digits.iter_mut().rev() {
            *slot = u8::try_from(word % 85).unwrap_or(0);
            word /= 85;
        }
        for digit in digits.iter().take(chunk.len() + 1) {
            out.push(char::from(digit + b'!'));
        }
    }
    out
}

fn ascii85_decode(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 4 / 5 + 4);
    let mut group: Vec<u32> = Vec::with_capacity(5);
    let flush = |group: &mut Vec<u32>, out: &mut Vec<u8>| {
        if group.is_empty() {
            return;
        }
        let count = group.len();
        while group.len() < 5 {
            group.push(84);
        }
        let word = group.iter().fold(0u64, |acc, d| acc * 85 + u64::from(*d));
        let bytes = u32::try_from(word & 0xffff_ffff)
            .unwrap_or(u32::MAX)
            .to_be_bytes();
        out.extend_from_slice(bytes.get(..count - 1).unwrap_or(&[]));
        group.clear();
    };
    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        if c == 'z' && group.is_empty() {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        if !('!'..='u').contains(&c) {
            return Err(Error::semantic(ErrorKind::InvalidEncoding));
        }
        group.push(u32::from(c) - u32::from('!'));
        if group.len() == 5 {
            flush(&mut group, &mut out);
        }
    }
    if group.len() == 1 {
        return Err(Error::semantic(ErrorKind::InvalidEncoding));
    }
    flush(&mut group, &mut out);
    Ok(out)
}

fn base91_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 8 / 6 + 2);
    let mut accumulator: u32 = 0;
    let mut bits: u32 = 0;
    for byte in bytes {
        accumulator |= u32::from(*byte) << bits;
        bits += 8;
        if bits > 13 {
            let mut chunk = accumulator & 8191;
            if chunk > 88 {
                accumulator >>= 13;
                bits -= 13;
            } else {
                chunk = accumulator & 16383;
                accumulator >>= 14;
                bits -= 14;
            }
            push_base91_pair(&mut out, chunk);
        }
    }
    if bits > 0 {
        out.push(base91_char(accumulator % 91));
        if bits > 7 || accumulator > 90 {
            out.push(base91_char(accumulator / 91));
        }
    }
    out
}

fn base91_decode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut accumulator: u32 = 0;
    let mut bits: u32 = 0;
    let mut pending: Option<u32> = None;
    for c in text.chars() {
        let Some(digit) = BASE91_ALPHABET
            .iter()
            .position(|b| char::from(*b) == c)
            .and_then(|i| u32::try_from(i).ok())
        else {
            continue;
        };
        match pending.take() {
            None => pending = Some(digit),
            Some(low) => {
                let chunk = low + digit * 91;
                accumulator |= chunk << bits;
                bits += if (chunk & 8191) > 88 { 13 } else { 14 };
                while bits >= 8 {
                    out.push(u8::try_from(accumulator & 0xff).unwrap_or(0));
                    accumulator >>= 8;
                    bits -= 8;
                }
            }
        }
    }
    if let Some(low) = pending {
        accumulator |= low << bits;
        out.push(u8::try_from(accumulator & 0xff).unwrap_or(0));
    }
    out
}

fn push_base91_pair(out: &mut String, chunk: u32) {
    out.push(base91_char(chunk % 91));
    out.push(base91_char(chunk / 91));
}

fn base91_char(index: u32) -> char {
    BASE91_ALPHABET
        .get(usize::try_from(index).unwrap_or(0))
        .map(|b| char::from(*b))
        .unwrap_or('A')
}

/// Digest `text` with every supported hash, keyed by algorithm id
pub fn hash_content(text: &str) -> IndexMap<String, String> {
    let bytes = text.as_bytes();
    let mut out = IndexMap::new();
    out.insert("md5".to_string(), HEXLOWER.encode(&Md5::digest(bytes)));
    out.insert("sha1".to_string(), HEXLOWER.encode(&Sha1::digest(bytes)));
    out.insert("sha224".to_string(), HEXLOWER.encode(&Sha224::digest(bytes)));
    out.insert("sha256".to_string(), HEXLOWER.encode(&Sha256::digest(bytes)));
    out.insert("sha384".to_string(), HEXLOWER.encode(&Sha384::digest(bytes)));
    out.insert("sha512".to_string(), HEXLOWER.encode(&Sha512::digest(bytes)));
    out.insert(
        "sha512_224".to_string(),
        HEXLOWER.encode(&Sha512_224::digest(bytes)),
    );
    out.insert(
        "sha512_256".to_string(),
        HEXLOWER.encode(&Sha512_256::digest(bytes)),
    );
    let crc32 = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);
    let crc32c = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
    let crc64_iso = crc::Crc::<u64>::new(&crc::CRC_64_GO_ISO);
    let crc64_ecma = crc::Crc::<u64>::new(&crc::CRC_64_ECMA_182);
    out.insert("crc32".to_string(), format!("{:08x}", crc32.checksum(bytes)));
    out.insert(
        "crc32c".to_string(),
        format!("{:08x}", crc32c.checksum(bytes)),
    );
    out.insert(
        "crc64_iso".to_string(),
        format!("{:016x}", crc64_iso.checksum(bytes)),
    );
    out.insert(
        "crc64_ecma".to_string(),
        format!("{:016x}", crc64_ecma.checksum(bytes)),
    );
    out.insert(
        "adler32".to_string(),
        format!("{:08x}", adler::adler32_slice(bytes)),
    );
    out.insert("fnv32".to_string(), format!("{:08x}", fnv32(bytes, false)));
    out.insert("fnv32a".to_string(), format!("{:08x}", fnv32(bytes, true)));
    out.insert("fnv64".to_string(), format!("{:016x}", fnv64(bytes, false)));
    out.insert("fnv64a".to_string(), format!("{:016x}", fnv64(bytes, true)));
    out
}

fn fnv32(bytes: &[u8], inverse: bool) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for byte in bytes {
        if inverse {
            hash ^= u32::from(*byte);
            hash = hash.wrapping_mul(16_777_619);
        } else {
            hash = hash.wrapping_mul(16_777_619);
            hash ^= u32::from(*byte);
        }
    }
    hash
}

fn fnv64(bytes: &[u8], inverse: bool) -> u64 {
    let mut hash: u64 = 14_695_981_039_346_656_037;
    for byte in bytes {
        if inverse {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(1_099_511_628_211);
        } else {
            hash = hash.wrapping_mul(1_099_511_628_211);
            hash ^= u64::from(*byte);
        }
    }
    hash
}

/// Percent-encode `text` for use in a URL component
pub fn url_encode(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

/// Reverse percent-encoding
pub fn url_decode(text: &str) -> Result<String> {
    urlencoding::decode(text)
        .map(|s| s.into_owned())
        .map_err(invalid)
}

/// Decoded JWT parts; the signature is reported but never verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedJwt {
    pub header: String,
    pub payload: String,
    pub algorithm: String,
}

/// Sign a JSON payload as an HS256/HS384/HS512 JWT
pub fn jwt_encode(payload: &str, secret: &str, algorithm: &str) -> Result<String> {
    let alg = match algorithm.to_ascii_uppercase().as_str() {
        "HS256" => "HS256",
        "HS384" => "HS384",
        "HS512" => "HS512",
        _ => return Err(Error::unsupported_format(algorithm)),
    };
    let claims = json::parser::parse(payload)?;
    let mut header = crate::value::Object::new();
    header.insert("alg", alg);
    header.insert("typ", "JWT");
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(json::writer::to_string_compact(&Value::Object(header))),
        URL_SAFE_NO_PAD.encode(json::writer::to_string_compact(&claims)),
    );
    let signature = hmac_sign(alg, secret.as_bytes(), signing_input.as_bytes())?;
    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

fn hmac_sign(alg: &str, secret: &[u8], input: &[u8]) -> Result<Vec<u8>> {
    let signature = match alg {
        "HS256" => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(invalid)?;
            mac.update(input);
            mac.finalize().into_bytes().to_vec()
        }
        "HS384" => {
            let mut mac = Hmac::<Sha384>::new_from_slice(secret).map_err(invalid)?;
            mac.update(input);
            mac.finalize().into_bytes().to_vec()
        }
        _ => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret).map_err(invalid)?;
            mac.update(input);
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(signature)
}

/// Split a JWT and pretty-print its header and payload without verifying
pub fn jwt_decode(token: &str) -> Result<DecodedJwt> {
    let mut parts = token.trim().split('.');
    let (Some(header_b64), Some(payload_b64)) = (parts.next(), parts.next()) else {
        return Err(Error::semantic(ErrorKind::InvalidEncoding));
    };
    let header = jwt_section(header_b64)?;
    let payload = jwt_section(payload_b64)?;
    let algorithm = header
        .as_object()
        .and_then(|o| o.get("alg"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    Ok(DecodedJwt {
        header: json::writer::to_string_pretty(&header),
        payload: json::writer::to_string_pretty(&payload),
        algorithm,
    })
}

fn jwt_section(b64: &str) -> Result<Value> {
    let bytes = URL_SAFE_NO_PAD
        .decode(b64.trim_end_matches('='))
        .map_err(invalid)?;
    let text = String::from_utf8(bytes).map_err(invalid)?;
    json::parser::parse(&text)
}
