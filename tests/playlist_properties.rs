use slideshow::Error;
use slideshow::catalog::ImageCatalog;
use slideshow::playlist::{PlaylistController, Selector};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

struct Scripted(VecDeque<usize>);

impl Selector for Scripted {
    fn pick(&mut self, _len: usize) -> usize {
        self.0.pop_front().expect("draw script exhausted")
    }
}

fn catalog(names: &[&str]) -> Arc<ImageCatalog> {
    let paths = names.iter().map(|n| PathBuf::from(format!("/photos/{n}.jpg")));
    Arc::new(ImageCatalog::from_paths("/photos", paths).unwrap())
}

fn name(entry: &slideshow::catalog::ImageEntry) -> String {
    entry.path().file_stem().unwrap().to_string_lossy().into_owned()
}

#[test]
fn scripted_draws_then_walk_back() {
    let cat = catalog(&["A", "B", "C", "D", "E", "F"]);
    let pl = PlaylistController::with_selector(cat, 3, Scripted([2, 0, 4].into())).unwrap();

    let shown: Vec<String> = (0..3).map(|_| name(&pl.next().unwrap())).collect();
    assert_eq!(shown, ["C", "A", "E"]);

    assert_eq!(name(&pl.previous().unwrap()), "A");
    assert_eq!(name(&pl.previous().unwrap()), "C");
    assert_eq!(name(&pl.previous().unwrap()), "C", "oldest entry is a floor");
    assert_eq!(pl.status().cursor, Some(0));
}

#[test]
fn every_draw_is_inside_the_catalog() {
    for n in [1usize, 3, 10, 64] {
        let names: Vec<String> = (0..n).map(|i| format!("img{i:03}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let pl = PlaylistController::new(catalog(&refs), 5).unwrap();
        for _ in 0..1_000 {
            let entry = pl.next().unwrap();
            assert!(entry.index() < n);
            assert_eq!(pl.catalog().entry_at(entry.index()).unwrap(), &entry);
        }
    }
}

#[test]
fn walk_back_returns_earlier_draws_in_reverse() {
    let cap = 5;
    for k in 1..=cap {
        let draws: Vec<usize> = (0..k).map(|i| (i * 3) % 7).collect();
        let pl = PlaylistController::with_selector(
            catalog(&["a", "b", "c", "d", "e", "f", "g"]),
            cap,
            Scripted(draws.iter().copied().collect()),
        )
        .unwrap();
        for _ in 0..k {
            pl.next().unwrap();
        }
        let back: Vec<usize> = (0..k - 1).map(|_| pl.previous().unwrap().index()).collect();
        let expected: Vec<usize> = draws[..k - 1].iter().rev().copied().collect();
        assert_eq!(back, expected, "k = {k}");

        let floor = pl.previous().unwrap().index();
        assert_eq!(floor, draws[0], "k = {k}: stepping past the first draw is a no-op");
    }
}

#[test]
fn one_draw_then_previous_stays_put() {
    let pl = PlaylistController::new(catalog(&["a", "b", "c"]), 5).unwrap();
    let first = pl.next().unwrap();
    assert_eq!(pl.previous().unwrap(), first);
    assert_eq!(pl.current().unwrap(), first);
}

#[test]
fn only_capacity_most_recent_are_recoverable() {
    let cap = 3;
    let m = 8;
    let draws: Vec<usize> = (0..m).collect();
    let names: Vec<String> = (0..m).map(|i| format!("p{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let pl =
        PlaylistController::with_selector(catalog(&refs), cap, Scripted(draws.into())).unwrap();
    for _ in 0..m {
        pl.next().unwrap();
    }

    let mut reachable = HashSet::new();
    reachable.insert(pl.current().unwrap().index());
    for _ in 0..cap * 4 {
        reachable.insert(pl.previous().unwrap().index());
    }
    let expected: HashSet<usize> = (m - cap..m).collect();
    assert_eq!(reachable, expected);
}

#[test]
fn previous_on_fresh_controller_is_an_error() {
    let pl = PlaylistController::new(catalog(&["a"]), 2).unwrap();
    assert!(matches!(pl.previous(), Err(Error::NoCurrentImage)));
}

/// Hands out 0, 1, 2, ... so every draw names a distinct entry in record order.
struct Counter(usize);

impl Selector for Counter {
    fn pick(&mut self, len: usize) -> usize {
        let i = self.0 % len;
        self.0 += 1;
        i
    }
}

#[test]
fn concurrent_next_and_previous_keep_history_consistent() {
    const NEXTS: usize = 2_000;
    const PREVS: usize = 2_000;
    const CAP: usize = 5;

    let names: Vec<String> = (0..=NEXTS).map(|i| format!("c{i:05}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let pl = Arc::new(PlaylistController::with_selector(catalog(&refs), CAP, Counter(0)).unwrap());
    let mut drawn = vec![pl.next().unwrap().index()];

    std::thread::scope(|s| {
        let nexts: Vec<_> = (0..2)
            .map(|_| {
                let pl = Arc::clone(&pl);
                s.spawn(move || {
                    (0..NEXTS / 2)
                        .map(|_| pl.next().unwrap().index())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for _ in 0..2 {
            let pl = Arc::clone(&pl);
            s.spawn(move || {
                for _ in 0..PREVS / 2 {
                    let e = pl.previous().unwrap();
                    assert!(e.index() <= NEXTS);
                    let st = pl.status();
                    assert!(st.current.is_some(), "cursor on an unfilled slot");
                }
            });
        }
        for h in nexts {
            drawn.extend(h.join().unwrap());
        }
    });

    // every call got its own record: the draws are exactly 0..=NEXTS
    drawn.sort_unstable();
    assert_eq!(drawn, (0..=NEXTS).collect::<Vec<_>>(), "a record was lost or duplicated");

    let st = pl.status();
    assert_eq!(st.recorded, (NEXTS + 1) as u64);
    assert_eq!(st.history_filled, CAP);
    assert!(st.cursor.is_some_and(|c| c < CAP));

    // walking back visits only older records
    let mut walk = vec![pl.current().unwrap().index()];
    while let Some(e) = pl.step_back().unwrap() {
        walk.push(e.index());
    }
    assert!(walk.len() <= CAP);
    assert!(
        walk.windows(2).all(|w| w[0] > w[1]),
        "step back reached a newer record: {walk:?}"
    );
}
