//! Certificate fixtures for unit tests

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509, X509Builder, X509Name, X509NameBuilder, X509NameRef, X509Ref};

pub(crate) fn generate_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn name_with_cn(cn: &str) -> X509Name {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, cn).unwrap();
    name.build()
}

fn builder(subject: &X509NameRef, issuer: &X509NameRef, key: &PKey<Private>) -> X509Builder {
    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    builder.set_serial_number(&serial.to_asn1_integer().unwrap()).unwrap();

    builder.set_subject_name(subject).unwrap();
    builder.set_issuer_name(issuer).unwrap();
    builder.set_pubkey(key).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(365).unwrap()).unwrap();
    builder
}

/// Self-signed CA certificate and its key
pub(crate) fn generate_ca(cn: &str) -> (X509, PKey<Private>) {
    let key = generate_key();
    let name = name_with_cn(cn);
    let mut builder = builder(&name, &name, &key);
    builder.append_extension(BasicConstraints::new().critical().ca().build().unwrap()).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    (builder.build(), key)
}

/// Intermediate CA signed by `issuer`
pub(crate) fn generate_intermediate(
    cn: &str,
    issuer: &X509Ref,
    issuer_key: &PKey<Private>,
) -> (X509, PKey<Private>) {
    let key = generate_key();
    let name = name_with_cn(cn);
    let mut builder = builder(&name, issuer.subject_name(), &key);
    builder.append_extension(BasicConstraints::new().critical().ca().build().unwrap()).unwrap();
    builder.sign(issuer_key, MessageDigest::sha256()).unwrap();
    (builder.build(), key)
}

/// End-entity certificate signed by `issuer`
pub(crate) fn generate_leaf(
    cn: &str,
    issuer: &X509Ref,
    issuer_key: &PKey<Private>,
) -> (X509, PKey<Private>) {
    let key = generate_key();
    let name = name_with_cn(cn);
    let mut builder = builder(&name, issuer.subject_name(), &key);
    builder.sign(issuer_key, MessageDigest::sha256()).unwrap();
    (builder.build(), key)
}

/// Self-signed certificate whose names carry no common name
pub(crate) fn generate_cert_without_cn() -> X509 {
    let key = generate_key();
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::ORGANIZATIONNAME, "No CN Inc").unwrap();
    let name = name.build();
    let mut builder = builder(&name, &name, &key);
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    builder.build()
}
