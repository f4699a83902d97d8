use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::Country;
use crate::db::{StoreError, StoreResult};

const COLUMNS: &str = "id, title, slug, description";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Country> {
    Ok(Country {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
    })
}

pub fn create(
    conn: &Connection,
    title: &str,
    slug: &str,
    description: Option<&str>,
) -> StoreResult<Country> {
    conn.execute(
        "INSERT INTO countries (title, slug, description) VALUES (?1, ?2, ?3)",
        params![title, slug, description],
    )?;
    by_id(conn, conn.last_insert_rowid())
}

pub fn by_id(conn: &Connection, id: i64) -> StoreResult<Country> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM countries WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound("country"))
}

pub fn by_slug(conn: &Connection, slug: &str) -> StoreResult<Country> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM countries WHERE slug = ?1"),
        params![slug],
        from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound("country"))
}

/// All countries ordered by title.
pub fn list(conn: &Connection) -> StoreResult<Vec<Country>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM countries ORDER BY title, id"
    ))?;
    let countries = stmt
        .query_map([], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(countries)
}

/// Remove a country; its posts stay, untagged.
pub fn delete_by_slug(conn: &Connection, slug: &str) -> StoreResult<bool> {
    let rows = conn.execute("DELETE FROM countries WHERE slug = ?1", params![slug])?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_pool;
    use crate::db::{posts, users};

    #[test]
    fn list_is_ordered_by_title() {
        let (pool, _tmp) = test_pool();
        let conn = pool.get().unwrap();

        create(&conn, "Norway", "norway", None).unwrap();
        create(&conn, "Chile", "chile", Some("Long and thin")).unwrap();
        create(&conn, "Japan", "japan", None).unwrap();

        let titles: Vec<String> = list(&conn).unwrap().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, ["Chile", "Japan", "Norway"]);
    }

    #[test]
    fn slug_is_unique() {
        let (pool, _tmp) = test_pool();
        let conn = pool.get().unwrap();

        create(&conn, "Chile", "chile", None).unwrap();
        let err = create(&conn, "Chile again", "chile", None).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn deleting_country_untags_posts() {
        let (pool, _tmp) = test_pool();
        let conn = pool.get().unwrap();

        let user = users::create(&conn, "ann", "hash").unwrap();
        let country = create(&conn, "Chile", "chile", None).unwrap();
        let post = posts::create(&conn, user.id, "Andes", Some(country.id), None).unwrap();

        assert!(delete_by_slug(&conn, "chile").unwrap());

        let post = posts::by_id(&conn, post.id).unwrap();
        assert_eq!(post.country_id, None);
        assert!(matches!(
            by_slug(&conn, "chile"),
            Err(StoreError::NotFound("country"))
        ));
    }
}
