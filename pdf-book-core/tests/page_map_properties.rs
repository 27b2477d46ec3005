use pdf_book_core::geometry::Size;
use pdf_book_core::page_map::{classify, progress, Direction, Half, PageMapper};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn build(widths: &[f32]) -> PageMapper {
    let sizes: Vec<_> = widths.iter().map(|&width| Size::new(width, 600.0)).collect();
    let mut mapper = PageMapper::default();
    mapper.build_from_sizes(&sizes);
    mapper
}

/// Page widths drawn from a narrow/wide mix so spreads actually occur.
fn mixed_widths() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(prop_oneof![Just(400.0f32), Just(420.0), Just(800.0), Just(900.0)], 1..40)
}

#[test]
fn wide_middle_page_becomes_a_spread() {
    let w = 400.0;
    let mapper = build(&[w, 2.0 * w * 1.6, w]);
    let map = mapper.map();
    assert_eq!(mapper.total_logical_pages(), 4);

    let from_middle: Vec<_> = map
        .logical_pages()
        .iter()
        .filter(|page| page.physical_index == 1)
        .map(|page| (page.relative_index, page.half))
        .collect();
    assert_eq!(from_middle, vec![(1, Half::Left), (2, Half::Right)]);
}

#[test]
fn classify_then_build_matches_build_from_sizes() {
    let sizes = [Size::new(100.0, 1.0), Size::new(300.0, 1.0)];
    let mut a = PageMapper::default();
    a.build(&classify(&sizes, 1.5));
    let mut b = PageMapper::default();
    b.build_from_sizes(&sizes);
    assert_eq!(a.map(), b.map());
}

proptest! {
    #[test]
    fn uniform_widths_yield_one_logical_page_each(width in 1.0f32..2_000.0, count in 1usize..60) {
        let mapper = build(&vec![width; count]);
        prop_assert_eq!(mapper.total_logical_pages(), count);
        prop_assert_eq!(mapper.map().render_unit_count(), count);
    }

    #[test]
    fn total_counts_spreads_twice(widths in mixed_widths()) {
        let mapper = build(&widths);
        let first = widths[0];
        let uniform = widths.iter().all(|w| *w == first);
        let expected: usize = widths
            .iter()
            .enumerate()
            .map(|(i, w)| if i > 0 && !uniform && *w >= first * 1.5 { 2 } else { 1 })
            .sum();
        prop_assert_eq!(mapper.total_logical_pages(), expected);
    }

    #[test]
    fn forward_and_reverse_maps_agree(widths in mixed_widths()) {
        let mapper = build(&widths);
        let map = mapper.map();
        for relative in 0..mapper.total_logical_pages() {
            let position = map.display_position(relative).unwrap();
            let leader = map.relative_index(position).unwrap();
            prop_assert!(leader <= relative);
            prop_assert_eq!(map.display_position(leader), Some(position));
            prop_assert_eq!(map.logical_page(relative).unwrap().relative_index, relative);
        }
        for position in 0..map.render_unit_count() {
            prop_assert!(map.relative_index(position).is_some());
        }
        prop_assert_eq!(map.relative_index(map.render_unit_count()), None);
    }

    #[test]
    fn navigation_round_trips_in_the_interior(count in 3usize..50, seed in any::<prop::sample::Index>()) {
        let mapper = build(&vec![500.0; count]);
        let i = 1 + seed.index(count - 2);
        let there = mapper.navigate_by(i, Direction::Increment);
        prop_assert_eq!(mapper.navigate_by(there, Direction::Decrement), i);
    }

    #[test]
    fn navigation_round_trips_from_unit_leaders(widths in mixed_widths()) {
        let mapper = build(&widths);
        let map = mapper.map();
        let units = map.render_unit_count();
        for position in 1..units.saturating_sub(1) {
            let leader = map.relative_index(position).unwrap();
            let there = mapper.navigate_by(leader, Direction::Increment);
            prop_assert_eq!(mapper.navigate_by(there, Direction::Decrement), leader);
        }
    }

    #[test]
    fn navigation_never_leaves_range(widths in mixed_widths(), start in 0usize..80, steps in prop::collection::vec(any::<bool>(), 0..100)) {
        let mapper = build(&widths);
        let total = mapper.total_logical_pages();
        let mut index = mapper.clamp_index(start as i64);
        for forward in steps {
            let direction = if forward { Direction::Increment } else { Direction::Decrement };
            index = mapper.navigate_by(index, direction);
            prop_assert!(index < total);
        }
    }

    #[test]
    fn ends_are_no_ops(widths in mixed_widths()) {
        let mapper = build(&widths);
        let last = mapper.total_logical_pages() - 1;
        prop_assert_eq!(mapper.navigate_by(0, Direction::Decrement), 0);
        prop_assert_eq!(mapper.navigate_by(last, Direction::Increment), last);
    }

    #[test]
    fn clamp_index_stays_in_range(widths in mixed_widths(), requested in any::<i64>()) {
        let mapper = build(&widths);
        let clamped = mapper.clamp_index(requested);
        prop_assert!(clamped < mapper.total_logical_pages());
        if requested >= 0 && (requested as u64) < mapper.total_logical_pages() as u64 {
            prop_assert_eq!(clamped as i64, requested);
        }
    }

    #[test]
    fn progress_spans_zero_to_hundred(total in 2usize..500, index in any::<prop::sample::Index>()) {
        prop_assert_eq!(progress(0, total), 0.0);
        prop_assert_eq!(progress(total - 1, total), 100.0);
        let p = progress(index.index(total), total);
        prop_assert!((0.0..=100.0).contains(&p));
        prop_assert_eq!(progress(index.index(total), 1), 0.0);
    }
}
