#![no_main]

use libfuzzer_sys::fuzz_target;
use rpki_mft::{cms_signing_time, Manifest};
use rpki_mft::cert::Cert;
use rpki_mft::manifest::ManifestContent;

fuzz_target!(|data: &[u8]| {
    let (which, data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };

    match which % 5 {
        0 => { let _ = Cert::decode(data); },
        1 => { let _ = ManifestContent::decode(data); },
        2 => { let _ = Manifest::decode(data, false); },
        3 => { let _ = Manifest::decode(data, true); },
        4 => { let _ = cms_signing_time(data); },
        _ => panic!("what?"),
    }
});
