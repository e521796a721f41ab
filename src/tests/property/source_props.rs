use proptest::prelude::*;

use crate::core::search::map_book_ids_to_sources;

proptest! {
    #[test]
    fn prop_source_is_last_segment_uppercased(
        segments in proptest::collection::vec("[a-z0-9]{1,6}", 1..5),
    ) {
        let id = segments.join("-");
        let sources = map_book_ids_to_sources(&[id]);

        prop_assert_eq!(sources.len(), 1);
        prop_assert_eq!(&sources[0], &segments[segments.len() - 1].to_uppercase());
    }

    #[test]
    fn prop_one_source_per_book(ids in proptest::collection::vec("[a-z-]{0,12}", 0..8)) {
        prop_assert_eq!(map_book_ids_to_sources(&ids).len(), ids.len());
    }
}
