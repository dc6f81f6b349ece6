use dishbook_core::classify::{dish_text_blob, ARCHETYPES};
use dishbook_core::{categorize_dish, Category, CategoryId, Dish, RichTextDelta, RuleClassifier};

fn catalog(names: &[&str]) -> Vec<Category> {
    names.iter().map(|name| Category::new(*name)).collect()
}

fn ids_named(categories: &[Category], names: &[&str]) -> Vec<CategoryId> {
    categories
        .iter()
        .filter(|category| names.contains(&category.name.as_str()))
        .map(|category| category.id)
        .collect()
}

#[test]
fn grilled_chicken_salad_matches_chicken_and_salad() {
    let categories = catalog(&["Chicken", "Salad", "Dessert"]);
    let dish = Dish::new("Grilled Chicken Salad");

    assert_eq!(
        categorize_dish(&dish, &categories),
        ids_named(&categories, &["Chicken", "Salad"])
    );
}

#[test]
fn meat_disqualifies_vegetarian() {
    let categories = catalog(&["Vegetarian"]);

    let chicken = Dish::new("grilled chicken with vegetables");
    assert!(categorize_dish(&chicken, &categories).is_empty());

    let named = Dish::new("Vegetarian lasagna with beef");
    assert!(categorize_dish(&named, &categories).is_empty());

    let tofu = Dish::new("Tofu stir fry with vegetables");
    assert_eq!(categorize_dish(&tofu, &categories), ids_named(&categories, &["Vegetarian"]));
}

#[test]
fn lithuanian_triggers_and_keywords_match() {
    let categories = catalog(&["Sriuba", "Vištiena", "Desertas"]);

    let soup = Dish::new("Šaltibarščiai").with_description("Šaltas burokėlių sultinys");
    assert_eq!(categorize_dish(&soup, &categories), ids_named(&categories, &["Sriuba"]));

    let cake = Dish::new("Medaus tortas");
    assert_eq!(categorize_dish(&cake, &categories), ids_named(&categories, &["Desertas"]));
}

#[test]
fn archetype_keywords_reach_categories_not_named_in_the_dish() {
    let categories = catalog(&["Pork dishes", "Seafood", "Breakfast"]);
    let dish = Dish::new("Bacon and eggs");

    assert_eq!(
        categorize_dish(&dish, &categories),
        ids_named(&categories, &["Pork dishes", "Breakfast"])
    );
}

#[test]
fn description_delta_text_contributes_to_matching() {
    let categories = catalog(&["Seafood"]);
    let description = serde_json::to_string(&RichTextDelta::from_plain_text("Fresh salmon fillet"))
        .unwrap();
    let dish = Dish::new("Chef's special").with_description(description);

    assert_eq!(categorize_dish(&dish, &categories), ids_named(&categories, &["Seafood"]));
}

#[test]
fn malformed_description_is_treated_as_plain_text() {
    let categories = catalog(&["Pasta"]);
    let dish = Dish::new("Chef's special").with_description("{\"ops\": [spaghetti");

    assert_eq!(categorize_dish(&dish, &categories), ids_named(&categories, &["Pasta"]));
    assert!(dish_text_blob(&dish).contains("spaghetti"));
}

#[test]
fn classification_is_pure_and_order_preserving() {
    let categories = catalog(&["Salad", "Chicken", "Soup", "Dessert"]);
    let dish = Dish::new("Chicken soup with a side salad");
    let classifier = RuleClassifier::new(ARCHETYPES);

    let first = classifier.categorize_dish(&dish, &categories);
    let second = classifier.categorize_dish(&dish, &categories);

    assert_eq!(first, second);
    assert_eq!(first, ids_named(&categories, &["Salad", "Chicken", "Soup"]));
}

#[test]
fn batch_categorize_leaves_out_unmatched_dishes() {
    let categories = catalog(&["Soup"]);
    let soup = Dish::new("Mushroom soup");
    let cake = Dish::new("Carrot cake");

    let result = RuleClassifier::default().batch_categorize(&[soup.clone(), cake], &categories);

    assert_eq!(result.len(), 1);
    assert_eq!(result.get(&soup.id), Some(&ids_named(&categories, &["Soup"])));
}

#[test]
fn empty_catalog_yields_nothing() {
    assert!(categorize_dish(&Dish::new("Anything"), &[]).is_empty());
}
