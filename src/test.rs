//! Fixtures for the unit tests.
//!
//! The crate only decodes, so the tests build their input with the tiny
//! DER writer in here. The builders produce a complete, valid object by
//! default and each of their methods breaks or changes exactly one thing.

use crate::der::ConstOid;
use crate::der::Oid;
use crate::oid;


//------------ Constants -----------------------------------------------------

pub const TEST_SKI: [u8; 20] = [
    0x3c, 0x9e, 0x51, 0x0a, 0x7f, 0x21, 0x48, 0xd2, 0x0b, 0x6c,
    0x55, 0x1e, 0x93, 0x02, 0xee, 0x47, 0xa8, 0x19, 0x70, 0xc5,
];

pub const TEST_AKI: [u8; 20] = [
    0xd8, 0x31, 0x04, 0xa2, 0x6e, 0x9b, 0x1f, 0x43, 0x87, 0x20,
    0xf5, 0x0c, 0x62, 0x3d, 0xb9, 0x11, 0x5a, 0xe4, 0x08, 0x7d,
];

/// The hash of the first file of the default manifest.
pub const FIRST_HASH: [u8; 32] = [
    0x57, 0xb7, 0xbc, 0x1a, 0x44, 0x0f, 0x29, 0x8e,
    0x63, 0xd0, 0x95, 0x2b, 0x7e, 0x81, 0x16, 0xcc,
    0x04, 0xfa, 0x3b, 0x52, 0xe9, 0x6d, 0x70, 0x18,
    0xa5, 0x4c, 0x0e, 0xb3, 0x9f, 0x22, 0xd6, 0x61,
];

pub const FIRST_FILE: &str = "F43VHX5As0tDn4_fTQUUEcU0cuo.crl";

/// The default manifest number, 0x9f123456789abcde.
pub const MANIFEST_NUMBER: u64 = 11462281547606572254;

/// The default signing time, 2025-01-01T01:44:39Z.
pub const SIGNING_TIME: &str = "250101014439Z";
pub const SIGNING_TIMESTAMP: i64 = 1735695879;

const ID_AT_COMMON_NAME: ConstOid = Oid(&[85, 4, 3]);
const CE_KEY_USAGE: ConstOid = Oid(&[85, 29, 15]);
const CE_CERTIFICATE_POLICIES: ConstOid = Oid(&[85, 29, 32]);
const PE_IP_ADDR_BLOCK: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 1, 7]);
const CP_IPADDR_ASNUMBER: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 14, 2]);
const BINARY_SIGNING_TIME: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 46]);


//------------ DER Writer ----------------------------------------------------

/// Encodes a value with a single identifier octet.
pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut res = vec![tag];
    let len = content.len();
    if len < 0x80 {
        res.push(len as u8);
    }
    else if len < 0x100 {
        res.push(0x81);
        res.push(len as u8);
    }
    else if len < 0x10000 {
        res.push(0x82);
        res.extend_from_slice(&(len as u16).to_be_bytes());
    }
    else {
        panic!("test value too long")
    }
    res.extend_from_slice(content);
    res
}

pub fn constructed(tag: u8, parts: &[Vec<u8>]) -> Vec<u8> {
    tlv(tag, &parts.concat())
}

pub fn seq(parts: &[Vec<u8>]) -> Vec<u8> {
    constructed(0x30, parts)
}

pub fn set(parts: &[Vec<u8>]) -> Vec<u8> {
    constructed(0x31, parts)
}

/// A constructed context specific value.
pub fn ctx(number: u8, parts: &[Vec<u8>]) -> Vec<u8> {
    constructed(0xA0 | number, parts)
}

/// A primitive context specific value.
pub fn ctx_prim(number: u8, content: &[u8]) -> Vec<u8> {
    tlv(0x80 | number, content)
}

pub fn boolean(value: bool) -> Vec<u8> {
    tlv(0x01, &[if value { 0xFF } else { 0 }])
}

/// A non-negative INTEGER in its minimal encoding.
pub fn int(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    let mut content = Vec::with_capacity(9);
    if bytes[start] & 0x80 != 0 {
        content.push(0);
    }
    content.extend_from_slice(&bytes[start..]);
    tlv(0x02, &content)
}

pub fn null() -> Vec<u8> {
    vec![0x05, 0x00]
}

pub fn oid(oid: ConstOid) -> Vec<u8> {
    tlv(0x06, oid.as_slice())
}

pub fn octets(content: &[u8]) -> Vec<u8> {
    tlv(0x04, content)
}

pub fn bits(unused: u8, content: &[u8]) -> Vec<u8> {
    let mut value = vec![unused];
    value.extend_from_slice(content);
    tlv(0x03, &value)
}

pub fn printable(s: &str) -> Vec<u8> {
    tlv(0x13, s.as_bytes())
}

pub fn ia5(s: &str) -> Vec<u8> {
    tlv(0x16, s.as_bytes())
}

pub fn utc_time(s: &str) -> Vec<u8> {
    tlv(0x17, s.as_bytes())
}

pub fn generalized_time(s: &str) -> Vec<u8> {
    tlv(0x18, s.as_bytes())
}

/// An AlgorithmIdentifier with a NULL parameter.
pub fn algorithm(alg: ConstOid) -> Vec<u8> {
    seq(&[oid(alg), null()])
}

pub fn name(common_name: &str) -> Vec<u8> {
    seq(&[set(&[seq(&[oid(ID_AT_COMMON_NAME), printable(common_name)])])])
}

fn extension(id: ConstOid, critical: bool, value: Vec<u8>) -> Vec<u8> {
    if critical {
        seq(&[oid(id), boolean(true), octets(&value)])
    }
    else {
        seq(&[oid(id), octets(&value)])
    }
}

fn access_description(method: ConstOid, uri: &str) -> Vec<u8> {
    seq(&[oid(method), ctx_prim(6, uri.as_bytes())])
}


//------------ CertBuilder ---------------------------------------------------

#[derive(Clone, Copy, Eq, PartialEq)]
enum AkiForm {
    Normal,
    Absent,
    WithoutKeyId,
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum SiaForm {
    Normal,
    Absent,
    Empty,
}

/// Builds an EE certificate as found in a signed manifest.
#[derive(Clone)]
pub struct CertBuilder {
    version: u64,
    ski: Option<Vec<u8>>,
    duplicate_ski: bool,
    aki: AkiForm,
    aia: bool,
    sia: SiaForm,
    unknown_critical: bool,
}

impl CertBuilder {
    pub fn new() -> Self {
        CertBuilder {
            version: 2,
            ski: Some(TEST_SKI.to_vec()),
            duplicate_ski: false,
            aki: AkiForm::Normal,
            aia: true,
            sia: SiaForm::Normal,
            unknown_critical: false,
        }
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn without_ski(mut self) -> Self {
        self.ski = None;
        self
    }

    pub fn short_ski(mut self) -> Self {
        self.ski = Some(TEST_SKI[..19].to_vec());
        self
    }

    pub fn duplicate_ski(mut self) -> Self {
        self.duplicate_ski = true;
        self
    }

    pub fn without_aki(mut self) -> Self {
        self.aki = AkiForm::Absent;
        self
    }

    pub fn aki_without_key_id(mut self) -> Self {
        self.aki = AkiForm::WithoutKeyId;
        self
    }

    pub fn without_aia(mut self) -> Self {
        self.aia = false;
        self
    }

    pub fn without_sia(mut self) -> Self {
        self.sia = SiaForm::Absent;
        self
    }

    pub fn empty_sia(mut self) -> Self {
        self.sia = SiaForm::Empty;
        self
    }

    pub fn with_unknown_critical_extension(mut self) -> Self {
        self.unknown_critical = true;
        self
    }

    fn extensions(&self) -> Vec<Vec<u8>> {
        let mut res = Vec::new();
        if let Some(ski) = self.ski.as_ref() {
            let ext = extension(
                oid::CE_SUBJECT_KEY_IDENTIFIER, false, octets(ski)
            );
            if self.duplicate_ski {
                res.push(ext.clone());
            }
            res.push(ext);
        }
        match self.aki {
            AkiForm::Normal => {
                res.push(extension(
                    oid::CE_AUTHORITY_KEY_IDENTIFIER, false,
                    seq(&[ctx_prim(0, &TEST_AKI)])
                ));
            }
            AkiForm::WithoutKeyId => {
                res.push(extension(
                    oid::CE_AUTHORITY_KEY_IDENTIFIER, false,
                    seq(&[ctx_prim(2, &[0x01])])
                ));
            }
            AkiForm::Absent => { }
        }
        res.push(extension(CE_KEY_USAGE, true, bits(7, &[0x80])));
        res.push(extension(
            oid::CE_CRL_DISTRIBUTION_POINTS, false,
            seq(&[seq(&[ctx(0, &[ctx(0, &[ctx_prim(
                6, b"rsync://rpki.example.net/repo/ca/revoked.crl"
            )])])])])
        ));
        if self.aia {
            res.push(extension(
                oid::PE_AUTHORITY_INFO_ACCESS, false,
                seq(&[access_description(
                    oid::AD_CA_ISSUERS,
                    "rsync://rpki.example.net/repo/ta/ca.cer"
                )])
            ));
        }
        match self.sia {
            SiaForm::Normal => {
                res.push(extension(
                    oid::PE_SUBJECT_INFO_ACCESS, false,
                    seq(&[
                        access_description(
                            oid::AD_SIGNED_OBJECT,
                            "rsync://rpki.example.net/repo/ca/manifest.mft"
                        ),
                        access_description(
                            oid::AD_RPKI_NOTIFY,
                            "https://rrdp.example.net/notification.xml"
                        ),
                    ])
                ));
            }
            SiaForm::Empty => {
                res.push(extension(
                    oid::PE_SUBJECT_INFO_ACCESS, false, seq(&[])
                ));
            }
            SiaForm::Absent => { }
        }
        res.push(extension(
            CE_CERTIFICATE_POLICIES, true,
            seq(&[seq(&[oid(CP_IPADDR_ASNUMBER)])])
        ));
        if self.unknown_critical {
            res.push(extension(
                PE_IP_ADDR_BLOCK, true,
                seq(&[seq(&[octets(&[0x00, 0x01]), null()])])
            ));
        }
        res
    }

    pub fn build(&self) -> Vec<u8> {
        let tbs = seq(&[
            ctx(0, &[int(self.version)]),
            int(0x1234),
            algorithm(oid::SHA256_WITH_RSA_ENCRYPTION),
            name("Test CA"),
            seq(&[utc_time("250101000000Z"), utc_time("260101000000Z")]),
            name("Test Manifest EE"),
            seq(&[
                algorithm(oid::RSA_ENCRYPTION),
                bits(0, &seq(&[int(0xC0FFEE), int(65537)])),
            ]),
            ctx(3, &[seq(&self.extensions())]),
        ]);
        seq(&[
            tbs,
            algorithm(oid::SHA256_WITH_RSA_ENCRYPTION),
            bits(0, b"sig"),
        ])
    }
}


//------------ ManifestBuilder -----------------------------------------------

/// Builds the eContent of a manifest.
#[derive(Clone)]
pub struct ManifestBuilder {
    version: Option<u64>,
    number: Vec<u8>,
    this_update: Vec<u8>,
    next_update: Vec<u8>,
    hash_alg: ConstOid,
    files: Vec<Vec<u8>>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        ManifestBuilder {
            version: None,
            number: int(MANIFEST_NUMBER),
            this_update: generalized_time("20250101000000Z"),
            next_update: generalized_time("20250102000000Z"),
            hash_alg: oid::SHA256,
            files: Vec::new(),
        }
        .file(FIRST_FILE, &FIRST_HASH)
        .file("one.roa", &[0xAB; 32])
        .file("two.roa", &[0xCD; 32])
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn number(mut self, number: u64) -> Self {
        self.number = int(number);
        self
    }

    pub fn negative_number(mut self) -> Self {
        self.number = tlv(0x02, &[0xFF]);
        self
    }

    pub fn utc_this_update(mut self) -> Self {
        self.this_update = utc_time("250101000000Z");
        self
    }

    pub fn next_update(mut self, time: &str) -> Self {
        self.next_update = generalized_time(time);
        self
    }

    pub fn hash_alg(mut self, alg: ConstOid) -> Self {
        self.hash_alg = alg;
        self
    }

    pub fn without_files(mut self) -> Self {
        self.files.clear();
        self
    }

    pub fn file(self, file: &str, hash: &[u8]) -> Self {
        self.raw_file(file, bits(0, hash))
    }

    /// Adds a file whose hash is given as a complete BIT STRING.
    pub fn raw_file(mut self, file: &str, hash: Vec<u8>) -> Self {
        self.files.push(seq(&[ia5(file), hash]));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut parts = Vec::new();
        if let Some(version) = self.version {
            parts.push(ctx(0, &[int(version)]));
        }
        parts.push(self.number.clone());
        parts.push(self.this_update.clone());
        parts.push(self.next_update.clone());
        parts.push(oid(self.hash_alg));
        parts.push(seq(&self.files));
        seq(&parts)
    }
}


//------------ SignedObjectBuilder -------------------------------------------

/// The form of the signing-time attribute.
#[derive(Clone, Copy, Debug)]
pub enum SigningTime {
    Absent,
    Utc(&'static str),
    Generalized(&'static str),

    /// An empty value set.
    Empty,

    /// A value that isn’t a time at all.
    Garbage,

    /// Two values in the value set.
    TwoValues,

    /// The value is not wrapped in a SET.
    NotASet,

    /// The attribute appears twice.
    Duplicate,
}

/// Builds a signed object wrapping a manifest.
#[derive(Clone)]
pub struct SignedObjectBuilder {
    content_type: ConstOid,
    content: Option<Vec<u8>>,
    certs: Vec<Vec<u8>>,
    crls: bool,
    signer_infos: usize,
    sid_version: u64,
    signed_attrs: bool,
    content_type_attr: Option<ConstOid>,
    message_digest: bool,
    signing_time: SigningTime,
    unknown_attr: bool,
}

impl SignedObjectBuilder {
    pub fn new() -> Self {
        SignedObjectBuilder {
            content_type: oid::CT_RPKI_MANIFEST,
            content: Some(ManifestBuilder::new().build()),
            certs: vec![CertBuilder::new().build()],
            crls: false,
            signer_infos: 1,
            sid_version: 3,
            signed_attrs: true,
            content_type_attr: Some(oid::CT_RPKI_MANIFEST),
            message_digest: true,
            signing_time: SigningTime::Utc(SIGNING_TIME),
            unknown_attr: false,
        }
    }

    pub fn content_type(mut self, content_type: ConstOid) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn manifest(mut self, manifest: ManifestBuilder) -> Self {
        self.content = Some(manifest.build());
        self
    }

    pub fn content(mut self, content: Option<Vec<u8>>) -> Self {
        self.content = content;
        self
    }

    pub fn cert(mut self, cert: CertBuilder) -> Self {
        self.certs = vec![cert.build()];
        self
    }

    pub fn cert_count(mut self, count: usize) -> Self {
        self.certs = vec![CertBuilder::new().build(); count];
        self
    }

    pub fn with_crls(mut self) -> Self {
        self.crls = true;
        self
    }

    pub fn signer_infos(mut self, count: usize) -> Self {
        self.signer_infos = count;
        self
    }

    pub fn sid_version(mut self, version: u64) -> Self {
        self.sid_version = version;
        self
    }

    pub fn without_signed_attrs(mut self) -> Self {
        self.signed_attrs = false;
        self
    }

    pub fn content_type_attr(
        mut self, content_type: Option<ConstOid>
    ) -> Self {
        self.content_type_attr = content_type;
        self
    }

    pub fn without_message_digest(mut self) -> Self {
        self.message_digest = false;
        self
    }

    pub fn signing_time(mut self, signing_time: SigningTime) -> Self {
        self.signing_time = signing_time;
        self
    }

    pub fn with_unknown_attr(mut self) -> Self {
        self.unknown_attr = true;
        self
    }

    fn attr(id: ConstOid, values: &[Vec<u8>]) -> Vec<u8> {
        seq(&[oid(id), set(values)])
    }

    fn signed_attrs(&self) -> Vec<Vec<u8>> {
        let mut res = Vec::new();
        if let Some(content_type) = self.content_type_attr {
            res.push(Self::attr(oid::CONTENT_TYPE, &[oid(content_type)]));
        }
        if self.message_digest {
            res.push(Self::attr(oid::MESSAGE_DIGEST, &[octets(&[0x11; 32])]));
        }
        match self.signing_time {
            SigningTime::Absent => { }
            SigningTime::Utc(time) => {
                res.push(Self::attr(oid::SIGNING_TIME, &[utc_time(time)]));
            }
            SigningTime::Generalized(time) => {
                res.push(Self::attr(
                    oid::SIGNING_TIME, &[generalized_time(time)]
                ));
            }
            SigningTime::Empty => {
                res.push(Self::attr(oid::SIGNING_TIME, &[]));
            }
            SigningTime::Garbage => {
                res.push(Self::attr(
                    oid::SIGNING_TIME, &[octets(b"garbage")]
                ));
            }
            SigningTime::TwoValues => {
                res.push(Self::attr(
                    oid::SIGNING_TIME,
                    &[utc_time(SIGNING_TIME), utc_time(SIGNING_TIME)]
                ));
            }
            SigningTime::NotASet => {
                res.push(seq(&[
                    oid(oid::SIGNING_TIME), utc_time(SIGNING_TIME)
                ]));
            }
            SigningTime::Duplicate => {
                let attr = Self::attr(
                    oid::SIGNING_TIME, &[utc_time(SIGNING_TIME)]
                );
                res.push(attr.clone());
                res.push(attr);
            }
        }
        if self.unknown_attr {
            res.push(Self::attr(
                BINARY_SIGNING_TIME, &[int(1735695879)]
            ));
        }
        res
    }

    fn signer_info(&self) -> Vec<u8> {
        let sid = if self.sid_version == 1 {
            seq(&[name("Test CA"), int(0x1234)])
        }
        else {
            ctx_prim(0, &TEST_SKI)
        };
        let mut parts = vec![
            int(self.sid_version),
            sid,
            seq(&[oid(oid::SHA256)]),
        ];
        if self.signed_attrs {
            parts.push(ctx(0, &self.signed_attrs()));
        }
        parts.push(algorithm(oid::RSA_ENCRYPTION));
        parts.push(octets(b"signature"));
        seq(&parts)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut encap = vec![oid(self.content_type)];
        if let Some(content) = self.content.as_ref() {
            encap.push(ctx(0, &[octets(content)]));
        }
        let mut signed_data = vec![
            int(3),
            set(&[algorithm(oid::SHA256)]),
            seq(&encap),
        ];
        if !self.certs.is_empty() {
            signed_data.push(ctx(0, &self.certs));
        }
        if self.crls {
            signed_data.push(ctx(1, &[]));
        }
        signed_data.push(set(&vec![self.signer_info(); self.signer_infos]));
        seq(&[
            oid(oid::SIGNED_DATA),
            ctx(0, &[seq(&signed_data)]),
        ])
    }
}


//============ Tests =========================================================

#[test]
fn int_is_minimal_and_non_negative() {
    use crate::der::Integer;

    for value in [0, 0x7F, 0x80, 0x1234, 0xC0FFEE, MANIFEST_NUMBER, u64::MAX] {
        let encoded = int(value);
        assert_eq!(&encoded[2..], Integer::from(value).as_slice());
        let decoded = crate::der::decode(&encoded, |cons| {
            cons.take::<Integer>()
        }).unwrap();
        assert_eq!(decoded.to_u64(), Some(value));
    }
}
