use crate::query::{
    Container, DeckCardRecord, Tokenizer, describe_groups, evaluate, group, group_numbers, tokenize, validate,
};
use crate::{AliasConfig, AliasSet, Condition, Operator, Parameter, Value, parse_query};

fn card_and_qty() -> AliasConfig {
    AliasConfig::new(vec![AliasSet::main(["card"]), AliasSet::new(["qty"])]).unwrap()
}

fn summary(conditions: &[Condition]) -> Vec<(u32, String, Operator, Value)> {
    conditions
        .iter()
        .map(|c| (c.group, c.parameter.to_string(), c.operator, c.value.clone()))
        .collect()
}

fn deck(uid: u64, archetype: u64, cards: &[(&str, u32, Container)]) -> Vec<DeckCardRecord> {
    cards
        .iter()
        .map(|&(name, quantity, container)| DeckCardRecord {
            deck_uid: uid,
            archetype_uid: archetype,
            event_uid: 77,
            cardname: name.to_string(),
            quantity,
            container,
        })
        .collect()
}

fn pool() -> Vec<DeckCardRecord> {
    use Container::{Mainboard, Sideboard};
    [
        deck(1, 10, &[("Lightning Bolt", 4, Mainboard), ("Fireblast", 2, Mainboard), ("Pyroblast", 2, Sideboard)]),
        deck(2, 10, &[("Lightning Bolt", 3, Mainboard), ("Fireblast", 4, Sideboard)]),
        deck(3, 20, &[("Counterspell", 4, Mainboard), ("Pyroblast", 1, Mainboard)]),
        deck(4, 30, &[("Lightning Bolt", 4, Sideboard), ("Fireblast", 4, Mainboard)]),
    ]
    .concat()
}

#[test]
fn single_clause_forms_one_group() {
    let conditions = parse_query("card Bolt qty>=4", &card_and_qty());
    assert_eq!(
        summary(&conditions),
        vec![
            (1, "card".to_string(), Operator::Equal, Value::Text("Bolt".into())),
            (1, "qty".to_string(), Operator::GreaterOrEqual, Value::Number(4.0)),
        ]
    );
}

#[test]
fn each_main_parameter_starts_a_group() {
    let conditions = parse_query("card A qty>=2 card B qty>=1", &card_and_qty());
    assert_eq!(
        summary(&conditions),
        vec![
            (1, "card".to_string(), Operator::Equal, Value::Text("A".into())),
            (1, "qty".to_string(), Operator::GreaterOrEqual, Value::Number(2.0)),
            (2, "card".to_string(), Operator::Equal, Value::Text("B".into())),
            (2, "qty".to_string(), Operator::GreaterOrEqual, Value::Number(1.0)),
        ]
    );
}

#[test]
fn one_condition_per_explicit_comparison() {
    let config = AliasConfig::cards();
    for (text, expected) in [
        ("", 0),
        ("nothing to see", 0),
        ("qty>=1", 1),
        ("card=Bolt qty>=1 is=mainboard", 3),
        ("card=Bolt qty>=1 card=Fireblast qty<=2 cont!=sideboard", 5),
        ("name=Lightning Bolt quantity=4", 2),
    ] {
        assert_eq!(tokenize(text).len(), expected, "{text}");
        assert_eq!(parse_query(text, &config).len(), expected, "{text}");
    }
}

#[test]
fn rendered_tokens_tokenize_to_themselves() {
    for text in ["card=Lightning Bolt qty>=4", "a!=1 b<2 c>3", "note=a=b d<=0.5"] {
        let tokens = tokenize(text);
        let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
        assert_eq!(tokenize(&rendered.join(" ")), tokens, "{text}");
    }
}

#[test]
fn group_numbers_are_contiguous_from_one() {
    let config = AliasConfig::cards();
    for text in [
        "qty>=1",
        "card A",
        "qty>=1 qty<=3 card A qty=2",
        "card A card B card C",
        "card A qty>=1 qty>=2 qty>=3 is=mainboard",
        "unknown=1 card A bogus=2 card B",
    ] {
        let conditions = parse_query(text, &config);
        let numbers = group_numbers(&conditions);
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected, "{text}");

        let mut previous = 1;
        for condition in &conditions {
            assert!(condition.group == previous || condition.group == previous + 1, "{text}");
            previous = condition.group;
        }
    }
}

#[test]
fn unknown_parameters_stay_unresolved() {
    let conditions = parse_query("colour=red card A", &AliasConfig::cards());
    assert_eq!(conditions[0].parameter, Parameter::Unresolved);
    assert_eq!(conditions[0].raw_parameter, "colour");
    assert_eq!(conditions[1].parameter, Parameter::Canonical("cardname".into()));
    assert_eq!(conditions[1].group, 1);
}

#[test]
fn conditions_within_a_group_share_one_record() {
    let config = AliasConfig::cards();
    let records = pool();

    let accepted = |text: &str| -> Vec<u64> {
        evaluate(&parse_query(text, &config), &records).accepted.into_iter().collect()
    };

    assert_eq!(accepted("card Lightning Bolt"), vec![1, 2, 4]);
    assert_eq!(accepted("card Lightning Bolt qty>=4"), vec![1, 4]);
    assert_eq!(accepted("card Lightning Bolt qty>=4 is=mainboard"), vec![1]);
    assert_eq!(accepted("card Lightning Bolt card Fireblast qty=4"), vec![2, 4]);
    assert_eq!(accepted("card Pyroblast is=sideboard card Counterspell"), Vec::<u64>::new());
    assert_eq!(accepted("card Pyroblast qty<2"), vec![3]);
}

#[test]
fn evaluation_ignores_condition_order() {
    let records = pool();
    let conditions = parse_query("card Fireblast qty>=2 is=mainboard card Lightning Bolt qty!=3", &AliasConfig::cards());
    let baseline = evaluate(&conditions, &records);
    assert_eq!(baseline.accepted.iter().copied().collect::<Vec<_>>(), vec![1, 4]);

    let mut reversed = conditions.clone();
    reversed.reverse();
    assert_eq!(evaluate(&reversed, &records), baseline);

    let mut rotated = conditions.clone();
    rotated.rotate_left(2);
    assert_eq!(evaluate(&rotated, &records), baseline);
}

#[test]
fn per_group_counts_are_reported() {
    let outcome = evaluate(&parse_query("card Lightning Bolt card Counterspell", &AliasConfig::cards()), &pool());
    assert!(outcome.accepted.is_empty());
    let counts: Vec<(u32, usize)> = outcome.groups.iter().map(|g| (g.group, g.accepted)).collect();
    assert_eq!(counts, vec![(1, 3), (2, 1)]);
}

#[test]
fn validated_pipeline_skips_broken_groups() {
    let config = AliasConfig::cards();
    let conditions = parse_query("card Fireblast cont=graveyard card Counterspell", &config);
    let validation = validate(conditions, None);
    assert!(validation.is_ignored(1));
    assert!(!validation.is_ignored(2));

    let outcome = evaluate(&validation.conditions, &pool());
    assert_eq!(outcome.accepted.into_iter().collect::<Vec<_>>(), vec![3]);
}

#[test]
fn keyword_tokenizer_reads_custom_aliases() {
    let config = AliasConfig::from_toml_str(
        r#"
        [[alias]]
        names = ["c", "cardname"]
        main = true

        [[alias]]
        names = ["n", "quantity"]
        "#,
    )
    .unwrap();
    let tokens = Tokenizer::for_config(&config).tokenize("c Lightning Bolt n>=4 c Fireblast");
    let conditions = group(&tokens, &config);
    assert_eq!(conditions.len(), 3);
    assert_eq!(conditions[0].value, Value::Text("Lightning Bolt".into()));
    assert_eq!(
        describe_groups(&conditions, " and ", " | "),
        "cardname = 'Lightning Bolt' and quantity >= 4 | cardname = 'Fireblast'"
    );
}
