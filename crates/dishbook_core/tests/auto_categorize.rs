use dishbook_core::classify::Archetype;
use dishbook_core::db::open_db_in_memory;
use dishbook_core::{
    CategorizationError, CategorizationService, Category, CategoryId, CategoryStore, Dish, DishId,
    DishStore, LanguageModel, ModelOutcome, RepoError, RepoResult, RuleClassifier,
    SqliteCategoryRepository, SqliteDishRepository, SqliteTagRepository, Suggestion,
    SuggestionClient, Tag, TagStore,
};
use rusqlite::Connection;
use uuid::Uuid;

type SqliteService<'conn, T> =
    CategorizationService<SqliteDishRepository<'conn>, SqliteCategoryRepository<'conn>, T>;

fn service(conn: &Connection) -> SqliteService<'_, SqliteTagRepository<'_>> {
    service_with_tags(conn, SqliteTagRepository::try_new(conn).unwrap())
}

fn service_with_tags<T: TagStore>(conn: &Connection, tags: T) -> SqliteService<'_, T> {
    CategorizationService::new(
        SqliteDishRepository::try_new(conn).unwrap(),
        SqliteCategoryRepository::try_new(conn).unwrap(),
        tags,
    )
}

fn add_category(conn: &Connection, name: &str) -> CategoryId {
    SqliteCategoryRepository::try_new(conn)
        .unwrap()
        .create_category(&Category::new(name))
        .unwrap()
}

fn add_dish(conn: &Connection, name: &str, category_ids: &[CategoryId]) -> DishId {
    SqliteDishRepository::try_new(conn)
        .unwrap()
        .create_dish(&Dish::new(name), category_ids)
        .unwrap()
}

fn tags_of(conn: &Connection, dish_id: DishId) -> Vec<CategoryId> {
    let mut ids = SqliteTagRepository::try_new(conn)
        .unwrap()
        .get_dish_category_ids(dish_id)
        .unwrap();
    ids.sort();
    ids
}

fn tag_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM dish_categories;", [], |row| row.get(0))
        .unwrap()
}

/// Tag store that fails every write for one dish.
struct FailingTagStore<T> {
    inner: T,
    failing_dish: DishId,
}

impl<T: TagStore> FailingTagStore<T> {
    fn check(&self, dish_id: DishId) -> RepoResult<()> {
        if dish_id == self.failing_dish {
            return Err(RepoError::InvalidInput("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl<T: TagStore> TagStore for FailingTagStore<T> {
    fn add_tags(&self, tags: &[Tag]) -> RepoResult<()> {
        for tag in tags {
            self.check(tag.dish_id)?;
        }
        self.inner.add_tags(tags)
    }

    fn get_dish_category_ids(&self, dish_id: DishId) -> RepoResult<Vec<CategoryId>> {
        self.inner.get_dish_category_ids(dish_id)
    }

    fn delete_dish_tags(&self, dish_id: DishId) -> RepoResult<()> {
        self.check(dish_id)?;
        self.inner.delete_dish_tags(dish_id)
    }

    fn replace_dish_tags(&self, dish_id: DishId, category_ids: &[CategoryId]) -> RepoResult<()> {
        self.check(dish_id)?;
        self.inner.replace_dish_tags(dish_id, category_ids)
    }
}

struct FixedModel(&'static str);

impl LanguageModel for FixedModel {
    fn generate(&self, _model: &str, _prompt: &str) -> ModelOutcome {
        ModelOutcome::Success(self.0.to_string())
    }
}

#[test]
fn tagged_dishes_are_skipped_without_overwrite() {
    let conn = open_db_in_memory().unwrap();
    let dessert = add_category(&conn, "Dessert");
    let soup = add_category(&conn, "Soup");
    let cake = add_dish(&conn, "Honey cake", &[dessert]);
    let mushroom = add_dish(&conn, "Mushroom soup", &[]);

    let stats = service(&conn).auto_categorize_dishes(false).unwrap();

    assert_eq!(stats.total_dishes, 2);
    assert_eq!(stats.categorized_dishes, 1);
    assert_eq!(stats.skipped_dishes, 1);
    assert_eq!(stats.failed_dishes, 0);
    assert_eq!(stats.categories_by_dish.get(&mushroom), Some(&vec![soup]));
    assert_eq!(tags_of(&conn, cake), vec![dessert]);
    assert_eq!(tags_of(&conn, mushroom), vec![soup]);
}

#[test]
fn overwrite_replaces_existing_tags() {
    let conn = open_db_in_memory().unwrap();
    let dessert = add_category(&conn, "Dessert");
    let soup = add_category(&conn, "Soup");
    let cake = add_dish(&conn, "Honey cake", &[soup]);

    let stats = service(&conn).auto_categorize_dishes(true).unwrap();

    assert_eq!(stats.categorized_dishes, 1);
    assert_eq!(tags_of(&conn, cake), vec![dessert]);
}

#[test]
fn overwrite_without_matches_keeps_existing_tags() {
    let conn = open_db_in_memory().unwrap();
    let soup = add_category(&conn, "Soup");
    let water = add_dish(&conn, "Sparkling water", &[soup]);

    let stats = service(&conn).auto_categorize_dishes(true).unwrap();

    assert_eq!(stats.skipped_dishes, 1);
    assert_eq!(stats.categorized_dishes, 0);
    assert_eq!(tags_of(&conn, water), vec![soup]);
}

#[test]
fn one_failing_dish_does_not_abort_the_batch() {
    let conn = open_db_in_memory().unwrap();
    let dessert = add_category(&conn, "Dessert");
    let soup = add_category(&conn, "Soup");
    let pie = add_dish(&conn, "Chocolate pie", &[]);
    let cake = add_dish(&conn, "Honey cake", &[]);
    let mushroom = add_dish(&conn, "Mushroom soup", &[]);

    let tags = FailingTagStore {
        inner: SqliteTagRepository::try_new(&conn).unwrap(),
        failing_dish: cake,
    };
    let stats = service_with_tags(&conn, tags)
        .auto_categorize_dishes(false)
        .unwrap();

    assert_eq!(stats.total_dishes, 3);
    assert_eq!(stats.categorized_dishes, 2);
    assert_eq!(stats.skipped_dishes, 0);
    assert_eq!(stats.failed_dishes, 1);
    assert!(!stats.categories_by_dish.contains_key(&cake));
    assert_eq!(tags_of(&conn, pie), vec![dessert]);
    assert!(tags_of(&conn, cake).is_empty());
    assert_eq!(tags_of(&conn, mushroom), vec![soup]);
}

#[test]
fn counters_always_add_up() {
    let conn = open_db_in_memory().unwrap();
    let soup = add_category(&conn, "Soup");
    add_category(&conn, "Pasta");
    add_dish(&conn, "Tomato soup", &[]);
    add_dish(&conn, "Spaghetti carbonara", &[]);
    add_dish(&conn, "Bread", &[]);
    let failing = add_dish(&conn, "Fish soup", &[]);
    add_dish(&conn, "Chicken soup", &[soup]);

    let tags = FailingTagStore {
        inner: SqliteTagRepository::try_new(&conn).unwrap(),
        failing_dish: failing,
    };
    let stats = service_with_tags(&conn, tags)
        .auto_categorize_dishes(false)
        .unwrap();

    assert_eq!(stats.total_dishes, 5);
    assert_eq!(
        stats.categorized_dishes + stats.skipped_dishes + stats.failed_dishes,
        stats.total_dishes
    );
    assert_eq!(stats.categorized_dishes, 2);
    assert_eq!(stats.skipped_dishes, 2);
    assert_eq!(stats.failed_dishes, 1);
}

#[test]
fn empty_catalog_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let dish_id = add_dish(&conn, "Mushroom soup", &[]);
    let service = service(&conn);

    assert!(matches!(
        service.auto_categorize_dishes(false),
        Err(CategorizationError::Validation(_))
    ));
    assert!(matches!(
        service.categorize_single_dish(dish_id, false),
        Err(CategorizationError::Validation(_))
    ));
    assert_eq!(tag_rows(&conn), 0);
}

#[test]
fn empty_corpus_yields_zero_stats() {
    let conn = open_db_in_memory().unwrap();
    add_category(&conn, "Soup");

    let stats = service(&conn).auto_categorize_dishes(false).unwrap();

    assert_eq!(stats.total_dishes, 0);
    assert!(stats.categories_by_dish.is_empty());
}

#[test]
fn preview_reports_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let dessert = add_category(&conn, "Dessert");
    add_category(&conn, "Soup");
    add_category(&conn, "breakfast");
    add_dish(&conn, "Mushroom soup", &[]);
    let pancakes = add_dish(&conn, "Pancake stack", &[dessert]);
    let before = tag_rows(&conn);

    let previews = service(&conn).preview_categorization().unwrap();

    assert_eq!(tag_rows(&conn), before);
    assert_eq!(previews.len(), 2);

    assert_eq!(previews[0].dish_name, "Mushroom soup");
    assert!(previews[0].current_categories.is_empty());
    assert_eq!(previews[0].suggested_categories.len(), 1);
    assert_eq!(previews[0].suggested_categories[0].category_name, "Soup");

    let second = &previews[1];
    assert_eq!(second.dish_id, pancakes);
    assert_eq!(second.current_categories, vec!["Dessert"]);
    let suggested = second
        .suggested_categories
        .iter()
        .map(|suggestion| suggestion.category_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(suggested, vec!["breakfast", "Dessert"]);
}

#[test]
fn single_dish_categorization() {
    let conn = open_db_in_memory().unwrap();
    let dessert = add_category(&conn, "Dessert");
    let soup = add_category(&conn, "Soup");
    let tagged = add_dish(&conn, "Mushroom soup", &[dessert]);
    let untagged = add_dish(&conn, "Chocolate pie", &[]);
    let plain = add_dish(&conn, "Bread", &[]);
    let service = service(&conn);

    assert_eq!(service.categorize_single_dish(tagged, false).unwrap(), vec![dessert]);
    assert_eq!(service.categorize_single_dish(tagged, true).unwrap(), vec![soup]);
    assert_eq!(tags_of(&conn, tagged), vec![soup]);

    assert_eq!(service.categorize_single_dish(untagged, false).unwrap(), vec![dessert]);
    assert!(service.categorize_single_dish(plain, false).unwrap().is_empty());

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.categorize_single_dish(missing, false),
        Err(CategorizationError::DishNotFound(id)) if id == missing
    ));
}

#[test]
fn ai_suggestions_skip_assigned_categories_until_applied() {
    let conn = open_db_in_memory().unwrap();
    let dessert = add_category(&conn, "Dessert");
    let soup = add_category(&conn, "Soup");
    let dish_id = add_dish(&conn, "Cold beet soup", &[soup]);
    let service = service(&conn);

    let model = FixedModel(r#"["Soup", "Dessert", "Invented"]"#);
    let client = SuggestionClient::new(&model);
    let suggestions = service.suggest_for_dish(&client, dish_id).unwrap();

    assert_eq!(
        suggestions,
        vec![Suggestion {
            category_id: dessert,
            category_name: "Dessert".to_string(),
        }]
    );
    assert_eq!(tags_of(&conn, dish_id), vec![soup]);

    service.apply_suggestions(dish_id, &suggestions).unwrap();
    let mut expected = vec![dessert, soup];
    expected.sort();
    assert_eq!(tags_of(&conn, dish_id), expected);
}

#[test]
fn ai_suggestions_for_missing_dish_fail() {
    let conn = open_db_in_memory().unwrap();
    add_category(&conn, "Soup");
    let service = service(&conn);
    let model = FixedModel("[]");
    let client = SuggestionClient::new(&model);

    assert!(matches!(
        service.suggest_for_dish(&client, Uuid::new_v4()),
        Err(CategorizationError::DishNotFound(_))
    ));
    assert!(matches!(
        service.apply_suggestions(Uuid::new_v4(), &[]),
        Err(CategorizationError::DishNotFound(_))
    ));
}

#[test]
fn ai_parse_errors_surface_as_suggest_errors() {
    let conn = open_db_in_memory().unwrap();
    add_category(&conn, "Soup");
    let dish_id = add_dish(&conn, "Borscht", &[]);
    let service = service(&conn);
    let model = FixedModel("no json here");
    let client = SuggestionClient::new(&model);

    assert!(matches!(
        service.suggest_for_dish(&client, dish_id),
        Err(CategorizationError::Suggest(_))
    ));
}

#[test]
fn custom_archetype_table_drives_the_batch() {
    const SPICY: &[Archetype] = &[Archetype {
        name: "spicy",
        category_triggers: &["hot"],
        dish_keywords: &["chili", "jalapeño"],
        exclusion_keywords: &["mild"],
    }];

    let conn = open_db_in_memory().unwrap();
    let hot = add_category(&conn, "Hot");
    let chili = add_dish(&conn, "Chili con carne", &[]);
    let mild = add_dish(&conn, "Mild chili", &[]);

    let default_run = service(&conn).auto_categorize_dishes(false).unwrap();
    assert_eq!(default_run.categorized_dishes, 0);

    let stats = service(&conn)
        .with_classifier(RuleClassifier::new(SPICY))
        .auto_categorize_dishes(false)
        .unwrap();

    assert_eq!(stats.categorized_dishes, 1);
    assert_eq!(stats.skipped_dishes, 1);
    assert_eq!(tags_of(&conn, chili), vec![hot]);
    assert!(tags_of(&conn, mild).is_empty());
}
