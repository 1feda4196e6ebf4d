//! Unit tests for the Identifiers module

use core_kernel::{ProductId, QuoteId, SpecialQuoteRequestId, TenantId};
use uuid::Uuid;

mod quote_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(QuoteId::new(), QuoteId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = QuoteId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = QuoteId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let id = QuoteId::from(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }
}

mod prefix_tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(TenantId::PREFIX, "TEN");
        assert_eq!(ProductId::PREFIX, "PRD");
        assert_eq!(QuoteId::PREFIX, "QUO");
        assert_eq!(SpecialQuoteRequestId::PREFIX, "SQR");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("PRD-not-a-uuid".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_parse_with_prefix() {
        let original = TenantId::new();
        let parsed: TenantId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let uuid = Uuid::new_v4();
        let id = ProductId::from(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));

        let back: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
