use dishbook_core::db::open_db_in_memory;
use dishbook_core::{
    Category, CategoryId, CategoryStore, Dish, DishId, DishStore, RepoError,
    SqliteCategoryRepository, SqliteDishRepository, SqliteTagRepository, Tag, TagStore,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed(conn: &Connection) -> (DishId, Vec<CategoryId>) {
    let dishes = SqliteDishRepository::try_new(conn).unwrap();
    let categories = SqliteCategoryRepository::try_new(conn).unwrap();
    let dish_id = dishes.create_dish(&Dish::new("Borscht"), &[]).unwrap();
    let category_ids = ["Soup", "Vegetarian", "Dessert"]
        .iter()
        .map(|name| categories.create_category(&Category::new(*name)).unwrap())
        .collect();
    (dish_id, category_ids)
}

fn sorted(mut ids: Vec<CategoryId>) -> Vec<CategoryId> {
    ids.sort();
    ids
}

#[test]
fn added_tags_are_returned_for_the_dish() {
    let conn = open_db_in_memory().unwrap();
    let (dish_id, category_ids) = seed(&conn);
    let tags = SqliteTagRepository::try_new(&conn).unwrap();

    tags.add_tags(&Tag::for_dish(dish_id, &category_ids[..2]))
        .unwrap();

    assert_eq!(
        sorted(tags.get_dish_category_ids(dish_id).unwrap()),
        sorted(category_ids[..2].to_vec())
    );
}

#[test]
fn re_adding_a_pair_keeps_one_row() {
    let conn = open_db_in_memory().unwrap();
    let (dish_id, category_ids) = seed(&conn);
    let tags = SqliteTagRepository::try_new(&conn).unwrap();

    let tag = Tag::new(dish_id, category_ids[0]);
    tags.add_tags(&[tag, tag]).unwrap();
    tags.add_tags(&[tag]).unwrap();

    assert_eq!(tags.get_dish_category_ids(dish_id).unwrap(), vec![category_ids[0]]);
}

#[test]
fn empty_batch_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let (dish_id, _) = seed(&conn);
    let tags = SqliteTagRepository::try_new(&conn).unwrap();

    tags.add_tags(&[]).unwrap();
    assert!(tags.get_dish_category_ids(dish_id).unwrap().is_empty());
}

#[test]
fn batch_with_unknown_category_commits_nothing() {
    let conn = open_db_in_memory().unwrap();
    let (dish_id, category_ids) = seed(&conn);
    let tags = SqliteTagRepository::try_new(&conn).unwrap();

    let batch = vec![
        Tag::new(dish_id, category_ids[0]),
        Tag::new(dish_id, Uuid::new_v4()),
    ];
    let err = tags.add_tags(&batch).unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert!(tags.get_dish_category_ids(dish_id).unwrap().is_empty());
}

#[test]
fn deleting_dish_tags_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let (dish_id, category_ids) = seed(&conn);
    let tags = SqliteTagRepository::try_new(&conn).unwrap();

    tags.add_tags(&Tag::for_dish(dish_id, &category_ids)).unwrap();
    tags.delete_dish_tags(dish_id).unwrap();
    assert!(tags.get_dish_category_ids(dish_id).unwrap().is_empty());

    tags.delete_dish_tags(dish_id).unwrap();
    tags.delete_dish_tags(Uuid::new_v4()).unwrap();
}

#[test]
fn deleting_one_dish_leaves_other_dishes_tagged() {
    let conn = open_db_in_memory().unwrap();
    let (first, category_ids) = seed(&conn);
    let dishes = SqliteDishRepository::try_new(&conn).unwrap();
    let second = dishes.create_dish(&Dish::new("Cake"), &[]).unwrap();
    let tags = SqliteTagRepository::try_new(&conn).unwrap();

    tags.add_tags(&[Tag::new(first, category_ids[0]), Tag::new(second, category_ids[2])])
        .unwrap();
    tags.delete_dish_tags(first).unwrap();

    assert_eq!(tags.get_dish_category_ids(second).unwrap(), vec![category_ids[2]]);
}

#[test]
fn replace_swaps_the_whole_set() {
    let conn = open_db_in_memory().unwrap();
    let (dish_id, category_ids) = seed(&conn);
    let tags = SqliteTagRepository::try_new(&conn).unwrap();

    tags.add_tags(&Tag::for_dish(dish_id, &category_ids[..2]))
        .unwrap();
    tags.replace_dish_tags(dish_id, &category_ids[2..]).unwrap();

    assert_eq!(tags.get_dish_category_ids(dish_id).unwrap(), vec![category_ids[2]]);
}

#[test]
fn failed_replace_keeps_previous_set() {
    let conn = open_db_in_memory().unwrap();
    let (dish_id, category_ids) = seed(&conn);
    let tags = SqliteTagRepository::try_new(&conn).unwrap();

    tags.add_tags(&[Tag::new(dish_id, category_ids[0])]).unwrap();
    assert!(tags
        .replace_dish_tags(dish_id, &[category_ids[1], Uuid::new_v4()])
        .is_err());

    assert_eq!(tags.get_dish_category_ids(dish_id).unwrap(), vec![category_ids[0]]);
}

#[test]
fn repository_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteTagRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("dish_categories"))
    ));
}
