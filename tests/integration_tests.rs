//! Integration tests for nullsms
//!
//! Note: decode() NEVER fails - unrecognized input yields a partial or empty
//! message, not an error.
//!
//! Covers:
//! - Codec round trips and carrier length for every alphabet
//! - Keystream masking and its explicit reversal
//! - Gateway quota, override, bot filter and length policy
//! - Quota atomicity under concurrent submits

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;

use nullsms::gateway::{ProviderError, QuotaStore};
use nullsms::{
    decode, decode_with_salt, encode, BitSequence, ClientContext, DispatchGateway,
    DispatchRequest, GatewayConfig, MessageProvider, Outcome, SendMode, SymbolAlphabet,
};

const PASSWORD: &str = "correct horse";

/// Provider that counts calls and takes a little time, so concurrent
/// requests overlap inside the gateway.
#[derive(Default)]
struct SlowCountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl MessageProvider for SlowCountingProvider {
    async fn send(&self, _destination: &str, _body: &str) -> Result<String, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(format!("SM{n:04}"))
    }

    fn name(&self) -> &str {
        "slow-counting"
    }
}

fn gateway(provider: Arc<dyn MessageProvider>) -> DispatchGateway {
    DispatchGateway::new(
        &GatewayConfig::default().with_override_password(PASSWORD),
        provider,
    )
}

fn request(body: &str, mode: SendMode, user_agent: &str) -> DispatchRequest {
    DispatchRequest {
        destination: "+15557654321".to_string(),
        body: body.to_string(),
        mode,
        override_credential: None,
        client: ClientContext {
            addr: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 44)),
            browser_id: "7f3e2a".to_string(),
            user_agent: user_agent.to_string(),
        },
    }
}

const BROWSER: &str = "Mozilla/5.0 (Linux; Android 14) Chrome/126.0 Mobile Safari/537.36";

fn latin1_text() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<u8>(), 0..64)
        .prop_map(|octets| octets.into_iter().map(char::from).collect())
}

fn alphabet() -> impl Strategy<Value = SymbolAlphabet> {
    prop::sample::select(SymbolAlphabet::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_roundtrip(text in latin1_text(), alphabet in alphabet()) {
        let carrier = encode(&text, alphabet, false, "").unwrap();
        prop_assert_eq!(decode(&carrier, alphabet), text);
    }

    #[test]
    fn prop_carrier_length(text in latin1_text(), alphabet in alphabet()) {
        let carrier = encode(&text, alphabet, false, "").unwrap();
        prop_assert_eq!(carrier.chars().count(), 8 * text.chars().count());
    }

    #[test]
    fn prop_salted_roundtrip(
        text in latin1_text(),
        salt in "[ -~]{1,16}",
        alphabet in alphabet(),
    ) {
        let carrier = encode(&text, alphabet, true, &salt).unwrap();
        prop_assert_eq!(carrier.chars().count(), 8 * text.chars().count());
        prop_assert_eq!(decode_with_salt(&carrier, alphabet, &salt), text);
    }
}

/// encode("Hi") = 01001000 01101001
#[test]
fn test_hi_example() {
    let bits = BitSequence::from_text("Hi").unwrap();
    assert_eq!(bits.to_binary_string(), "01001000 01101001");

    let carrier = encode("Hi", SymbolAlphabet::Zwsp, false, "").unwrap();
    let expected: String = "0100100001101001"
        .chars()
        .map(|b| if b == '1' { '\u{200C}' } else { '\u{200B}' })
        .collect();
    assert_eq!(carrier, expected);
    assert_eq!(decode(&carrier, SymbolAlphabet::Zwsp), "Hi");
}

/// Obfuscated carriers only come back through the salted path.
#[test]
fn test_obfuscated_needs_salt() {
    let carrier = encode("rendezvous", SymbolAlphabet::Zwnj, true, "1718000000000").unwrap();
    assert_ne!(decode(&carrier, SymbolAlphabet::Zwnj), "rendezvous");
    assert_eq!(
        decode_with_salt(&carrier, SymbolAlphabet::Zwnj, "1718000000000"),
        "rendezvous"
    );
}

/// A carrier pasted with surrounding chatter still decodes.
#[test]
fn test_decode_from_noisy_paste() {
    let carrier = encode("psst", SymbolAlphabet::Braille, false, "").unwrap();
    let pasted = format!("> {carrier}\n\nsent from my phone");
    assert_eq!(decode(&pasted, SymbolAlphabet::Braille), "psst");
}

#[test]
fn test_wide_characters_rejected() {
    assert!(encode("naïve", SymbolAlphabet::Zwsp, false, "").is_ok());
    assert!(encode("日本", SymbolAlphabet::Zwsp, false, "").is_err());
}

/// First send passes, second needs the password, the overridden third does
/// not count.
#[tokio::test]
async fn test_quota_lifecycle() {
    let provider = Arc::new(SlowCountingProvider::default());
    let gw = gateway(provider.clone());
    let carrier = encode("hello", SymbolAlphabet::Zwsp, false, "").unwrap();
    let mut req = request(&carrier, SendMode::Invisible, BROWSER);
    let key = req.client.key();

    assert_eq!(gw.guard().quota().count(&key), 0);
    assert!(gw.submit(&req).await.is_dispatched());
    assert_eq!(gw.guard().quota().count(&key), 1);

    assert!(matches!(
        gw.submit(&req).await,
        Outcome::QuotaExceeded { count: 1, limit: 1 }
    ));

    req.override_credential = Some("incorrect horse".to_string());
    assert!(matches!(gw.submit(&req).await, Outcome::QuotaExceeded { .. }));

    req.override_credential = Some(PASSWORD.to_string());
    assert!(matches!(
        gw.submit(&req).await,
        Outcome::Dispatched { overridden: true, .. }
    ));
    assert_eq!(gw.guard().quota().count(&key), 1);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_bots_always_forbidden() {
    let gw = gateway(Arc::new(SlowCountingProvider::default()));

    for agent in [
        "",
        "curl/8.4.0",
        "MyBot/1.0",
        "Baiduspider",
        "Scrapy/2.11",
        "Python-urllib/3.12",
    ] {
        let mut req = request("hi", SendMode::Normal, agent);
        req.override_credential = Some(PASSWORD.to_string());
        assert_eq!(gw.submit(&req).await, Outcome::Forbidden, "{agent:?}");
    }

    // Still forbidden once the client's quota is used up.
    let human = request("hi", SendMode::Normal, BROWSER);
    assert!(gw.submit(&human).await.is_dispatched());
    let bot = request("hi", SendMode::Normal, "curl/8.4.0");
    assert_eq!(gw.submit(&bot).await, Outcome::Forbidden);
}

#[tokio::test]
async fn test_length_policy() {
    let gw = gateway(Arc::new(SlowCountingProvider::default()));
    let body = "z".repeat(161);

    assert_eq!(
        gw.submit(&request(&body, SendMode::Normal, BROWSER)).await,
        Outcome::TooLong { len: 161, max: 160 }
    );
    assert!(gw
        .submit(&request(&body, SendMode::Invisible, BROWSER))
        .await
        .is_dispatched());
}

/// N concurrent submits for one fresh client: exactly one goes out.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submits_respect_quota() {
    const N: usize = 32;

    let provider = Arc::new(SlowCountingProvider::default());
    let gw = Arc::new(gateway(provider.clone()));

    let tasks: Vec<_> = (0..N)
        .map(|_| {
            let gw = Arc::clone(&gw);
            tokio::spawn(async move {
                let req = request("race", SendMode::Normal, BROWSER);
                gw.submit(&req).await
            })
        })
        .collect();

    let outcomes: Vec<Outcome> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let dispatched = outcomes.iter().filter(|o| o.is_dispatched()).count();
    let exceeded = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::QuotaExceeded { .. }))
        .count();

    assert_eq!(dispatched, 1);
    assert_eq!(exceeded, N - 1);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let key = request("race", SendMode::Normal, BROWSER).client.key();
    assert_eq!(gw.guard().quota().count(&key), 1);
}

/// Higher limits are honoured exactly under contention too.
#[test]
fn test_quota_store_limit_three_threads() {
    let store = Arc::new(QuotaStore::new(3));
    let key = nullsms::gateway::ClientKey::new(IpAddr::V4(Ipv4Addr::LOCALHOST), "shared");
    let granted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..24)
        .map(|_| {
            let store = Arc::clone(&store);
            let key = key.clone();
            let granted = Arc::clone(&granted);
            std::thread::spawn(move || {
                if let Ok(slot) = store.try_reserve(&key) {
                    granted.fetch_add(1, Ordering::SeqCst);
                    slot.commit();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(granted.load(Ordering::SeqCst), 3);
    assert_eq!(store.count(&key), 3);
}
