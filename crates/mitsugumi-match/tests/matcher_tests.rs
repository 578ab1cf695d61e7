use mitsugumi_core::connectives::ConnectiveDict;
use mitsugumi_core::types::{LeafToken, MorphKind};
use mitsugumi_match::{Matcher, Pattern};

fn core(text: &str) -> LeafToken {
    LeafToken::new(MorphKind::Core, text)
}

fn func(text: &str) -> LeafToken {
    LeafToken::new(MorphKind::Func, text)
}

fn matcher() -> Matcher {
    Matcher::new(ConnectiveDict::from_entries(["と", "や", "および"]))
}

#[test]
fn binds_slots_around_func_literals() {
    let pattern = Pattern::compile("[X1]は[Y1]").expect("compile");
    let leaves = [core("太郎"), func("は"), core("読む")];

    let result = matcher().match_pattern(&pattern, &leaves).expect("match");
    assert_eq!(result.bindings["X1"].value, "太郎");
    assert_eq!(result.bindings["Y1"].value, "読む");
    assert_eq!((result.start, result.end), (0, 3));
    assert_eq!((result.bindings["X1"].start, result.bindings["X1"].end), (0, 1));
    assert_eq!((result.bindings["Y1"].start, result.bindings["Y1"].end), (2, 3));
}

#[test]
fn slots_consume_consecutive_core_leaves_greedily() {
    let pattern = Pattern::compile("[X1]は[Y1]").expect("compile");
    let leaves = [core("東京"), core("都"), func("は"), core("住む")];

    let result = matcher().match_pattern(&pattern, &leaves).expect("match");
    assert_eq!(result.bindings["X1"].value, "東京都");
    assert_eq!((result.bindings["X1"].start, result.bindings["X1"].end), (0, 2));
}

#[test]
fn later_offsets_are_tried_in_increasing_order() {
    let pattern = Pattern::compile("[X1]は[Y1]").expect("compile");
    let leaves = [func("が"), core("太郎"), func("は"), core("読む")];

    let result = matcher().match_pattern(&pattern, &leaves).expect("match");
    assert_eq!(result.start, 1, "leading func leaf cannot open a slot");
    assert_eq!(result.bindings["X1"].value, "太郎");
}

#[test]
fn empty_leaf_stream_never_matches() {
    let pattern = Pattern::compile("[X1]は[Y1]").expect("compile");
    assert!(matcher().match_pattern(&pattern, &[]).is_none());
}

#[test]
fn literal_requires_a_func_leaf_containing_the_character() {
    let pattern = Pattern::compile("[X1]を[Y1]").expect("compile");
    // は does not contain を
    let leaves = [core("太郎"), func("は"), core("読む")];
    assert!(matcher().match_pattern(&pattern, &leaves).is_none());
}

#[test]
fn literal_matches_inside_a_longer_func_leaf() {
    let pattern = Pattern::compile("[X1]に[Y1]").expect("compile");
    let leaves = [core("棚"), func("には"), core("置く")];
    assert!(matcher().match_pattern(&pattern, &leaves).is_some());
}

#[test]
fn literal_matches_through_connective_synonyms_both_ways() {
    let pattern = Pattern::compile("[X1]と[X2]").expect("compile");
    let leaves = [core("犬"), func("及び"), core("猫")];

    // Literal as the canonical key
    let forward = Matcher::new(ConnectiveDict::from_groups([("と", vec!["及び"])]));
    assert!(forward.match_pattern(&pattern, &leaves).is_some());

    // Surface form as the canonical key, literal among its synonyms
    let reverse = Matcher::new(ConnectiveDict::from_groups([("及び", vec!["と"])]));
    assert!(reverse.match_pattern(&pattern, &leaves).is_some());

    // Unregistered pair fails
    let unrelated = Matcher::new(ConnectiveDict::from_entries(["や"]));
    assert!(unrelated.match_pattern(&pattern, &leaves).is_none());
}

#[test]
fn wildcard_accepts_any_registered_connective() {
    let pattern = Pattern::compile("[X1]&[X2]").expect("compile");

    let leaves = [core("犬"), func("や"), core("猫")];
    assert!(matcher().match_pattern(&pattern, &leaves).is_some());

    let not_a_connective = [core("犬"), func("を"), core("猫")];
    assert!(matcher().match_pattern(&pattern, &not_a_connective).is_none());
}

#[test]
fn wildcard_accepts_core_kind_connectives_too() {
    // Smoothing can reclassify a sandwiched connective as core; the wildcard
    // must still recognize it when it sits at the current position.
    let pattern = Pattern::compile("&[X1]").expect("compile");
    let leaves = [core("と"), core("本")];
    let result = matcher().match_pattern(&pattern, &leaves).expect("match");
    assert_eq!(result.bindings["X1"].value, "本");
}

#[test]
fn verbal_noun_tag_accepts_known_and_kanji_suru_verbs() {
    let pattern = Pattern::compile("[X1]を[Y1-サ変]").expect("compile");

    let known = [core("方針"), func("を"), core("検討する")];
    assert!(matcher().match_pattern(&pattern, &known).is_some());

    // Not in the closed set, but kanji + する
    let derived = [core("薬品"), func("を"), core("爆発する")];
    assert!(matcher().match_pattern(&pattern, &derived).is_some());
}

#[test]
fn verbal_noun_tag_rejects_incompatible_verbs() {
    let pattern = Pattern::compile("[X1]を[Y1-サ変]").expect("compile");

    let plain_verb = [core("体"), func("を"), core("動く")];
    assert!(matcher().match_pattern(&pattern, &plain_verb).is_none());

    // する suffix but no CJK ideograph before it
    let katakana = [core("資料"), func("を"), core("コピーする")];
    assert!(matcher().match_pattern(&pattern, &katakana).is_none());
}
