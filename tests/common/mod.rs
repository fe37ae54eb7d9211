//! Shared fixtures for integration tests
//!
//! Generates throwaway CAs and serves a chosen certificate chain from a local
//! TLS listener.

#![allow(dead_code)]

use std::io::Read;
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::ssl::{SslAcceptor, SslMethod};
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509, X509Builder, X509NameBuilder, X509NameRef, X509Ref};

pub struct Issued {
    pub cert: X509,
    pub key: PKey<Private>,
}

fn generate_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn issue(cn: &str, issuer: Option<(&X509NameRef, &PKey<Private>)>, is_ca: bool) -> Issued {
    let key = generate_key();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::ORGANIZATIONNAME, cn).unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, cn).unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    builder.set_serial_number(&serial.to_asn1_integer().unwrap()).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(365).unwrap()).unwrap();
    if is_ca {
        builder.append_extension(BasicConstraints::new().critical().ca().build().unwrap()).unwrap();
    }

    match issuer {
        Some((issuer_name, issuer_key)) => {
            builder.set_issuer_name(issuer_name).unwrap();
            builder.sign(issuer_key, MessageDigest::sha256()).unwrap();
        }
        None => {
            builder.set_issuer_name(&name).unwrap();
            builder.sign(&key, MessageDigest::sha256()).unwrap();
        }
    }

    Issued { cert: builder.build(), key }
}

/// Self-signed CA
pub fn root_ca(cn: &str) -> Issued {
    issue(cn, None, true)
}

/// CA signed by `issuer`
pub fn intermediate_ca(cn: &str, issuer: &Issued) -> Issued {
    issue(cn, Some((issuer.cert.subject_name(), &issuer.key)), true)
}

/// Server certificate signed by `issuer`
pub fn server_cert(cn: &str, issuer: &Issued) -> Issued {
    issue(cn, Some((issuer.cert.subject_name(), &issuer.key)), false)
}

/// PEM bundle text of `certs`, wrapped the way bundle files usually are
pub fn pem_bundle(certs: &[&X509Ref]) -> Vec<u8> {
    let mut bundle = b"## Test reference bundle\n\n".to_vec();
    for cert in certs {
        bundle.extend_from_slice(&cert.to_pem().unwrap());
        bundle.push(b'\n');
    }
    bundle
}

/// A TLS listener serving one fixed chain
pub struct TlsServer {
    pub addr: SocketAddr,
    handle: JoinHandle<usize>,
}

impl TlsServer {
    /// Serve `leaf` followed by `extra` for `connections` handshakes
    pub fn start(leaf: &Issued, extra: &[&X509], connections: usize) -> Self {
        let mut acceptor = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).unwrap();
        acceptor.set_private_key(&leaf.key).unwrap();
        acceptor.set_certificate(&leaf.cert).unwrap();
        for cert in extra {
            acceptor.add_extra_chain_cert((*cert).clone()).unwrap();
        }
        acceptor.check_private_key().unwrap();
        let acceptor = acceptor.build();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut completed = 0;
            for _ in 0..connections {
                let (stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                if let Ok(mut tls) = acceptor.accept(stream) {
                    completed += 1;
                    // Wait for the client to hang up
                    let mut buf = [0u8; 1];
                    let _ = tls.read(&mut buf);
                }
            }
            completed
        });

        Self { addr, handle }
    }

    /// `host:port` of the listener
    pub fn target(&self) -> String {
        self.addr.to_string()
    }

    /// Wait for the server thread, returning the number of completed handshakes
    pub fn join(self) -> usize {
        self.handle.join().unwrap()
    }
}
