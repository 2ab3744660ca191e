use appenv_core::{decompose_secret_uri, derive_env_name, is_secret_reference, SecretReference};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn env_name_is_total_and_deterministic(key in "[a-zA-Z0-9/]{0,64}") {
        let first = derive_env_name(&key);
        let second = derive_env_name(&key);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), key.len());
        prop_assert!(!first.contains('/'));
        prop_assert_eq!(first.matches('_').count(), key.matches('/').count());
        prop_assert_eq!(first.clone(), first.to_uppercase());
    }

    #[test]
    fn secret_uri_round_trips(
        host in "[a-z][a-z0-9]{0,15}",
        name in "[A-Za-z0-9-]{1,32}",
        version in proptest::option::of("[a-f0-9]{8,32}"),
    ) {
        let reference = SecretReference::new(
            format!("https://{host}.vault.azure.net"),
            name,
            version,
        );
        let uri = reference.to_uri();
        let parsed = decompose_secret_uri(&uri).unwrap();
        prop_assert_eq!(parsed, reference);
    }

    #[test]
    fn marker_match_is_substring(prefix in "[a-z/.+]{0,20}", suffix in "[a-z;=+-]{0,20}") {
        let hint = format!("{prefix}keyvaultref{suffix}");
        prop_assert!(is_secret_reference(Some(&hint)));
    }
}

#[test]
fn test_documented_examples() {
    assert_eq!(
        derive_env_name("MyService/Database/Host"),
        "MYSERVICE_DATABASE_HOST"
    );
    let reference =
        decompose_secret_uri("https://v.vault.azure.net/secrets/MySecret/abc123").unwrap();
    assert_eq!(
        reference,
        SecretReference::new(
            "https://v.vault.azure.net",
            "MySecret",
            Some("abc123".to_string())
        )
    );
}
