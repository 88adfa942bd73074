use sqlx::SqlitePool;
use uuid::Uuid;

// Primary keys are v7 uuids rendered to strings. Listing order leans on
// sqlite's rowid: insertion order, the store's default iteration order.

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub uuid: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Topic {
    pub uuid: String,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Room {
    pub uuid: String,
    pub host_id: String,
    pub topic_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub uuid: String,
    pub room_id: String,
    pub user_id: String,
    pub body: String,
    pub created: String,
}

/// A room row joined with its host and topic names, as the listing pages
/// show it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomOverview {
    pub uuid: String,
    pub name: String,
    pub description: Option<String>,
    pub host_name: String,
    pub topic_name: String,
    pub created: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageOverview {
    pub uuid: String,
    pub body: String,
    pub created: String,
    pub author: String,
    pub room_id: String,
    pub room_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopicOverview {
    pub uuid: String,
    pub name: String,
    pub room_count: i64,
}

/// icontains-style `%q%` pattern with LIKE wildcards in q neutralized.
/// Queries using it must carry `ESCAPE '\'`.
fn contains(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> sqlx::Result<User> {
    let uuid = Uuid::now_v7().to_string();
    // usernames and emails are stored lowercase, lookups count on it
    let username = username.to_lowercase();
    let email = email.to_lowercase();
    sqlx::query("INSERT INTO users (uuid,username,email,password_hash) VALUES (?,?,?,?)")
        .bind(&uuid)
        .bind(&username)
        .bind(&email)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(User {
        uuid,
        username,
        email,
        password_hash: password_hash.to_owned(),
        avatar: None,
        bio: None,
    })
}

pub async fn user_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE email=?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn user_by_uuid(pool: &SqlitePool, uuid: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE uuid=?")
        .bind(uuid)
        .fetch_optional(pool)
        .await
}

pub async fn update_user(
    pool: &SqlitePool,
    uuid: &str,
    username: &str,
    email: &str,
    bio: Option<&str>,
    avatar: Option<&str>,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET username=?, email=?, bio=?, avatar=? WHERE uuid=?")
        .bind(username.to_lowercase())
        .bind(email.to_lowercase())
        .bind(bio)
        .bind(avatar)
        .bind(uuid)
        .execute(pool)
        .await?;
    Ok(())
}

/// Find-by-exact-name, else insert. Two racing creators both land on the
/// same row: the UNIQUE constraint swallows the loser's insert.
pub async fn get_or_create_topic(pool: &SqlitePool, name: &str) -> sqlx::Result<Topic> {
    sqlx::query("INSERT INTO topics (uuid,name) VALUES (?,?) ON CONFLICT(name) DO NOTHING")
        .bind(Uuid::now_v7().to_string())
        .bind(name)
        .execute(pool)
        .await?;
    sqlx::query_as("SELECT uuid,name FROM topics WHERE name=?")
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn topics(pool: &SqlitePool, q: &str) -> sqlx::Result<Vec<Topic>> {
    sqlx::query_as("SELECT uuid,name FROM topics WHERE name LIKE ? ESCAPE '\\' ORDER BY rowid")
        .bind(contains(q))
        .fetch_all(pool)
        .await
}

pub async fn topics_with_counts(pool: &SqlitePool, q: &str) -> sqlx::Result<Vec<TopicOverview>> {
    sqlx::query_as(
        "SELECT t.uuid, t.name, COUNT(r.uuid) AS room_count \
         FROM topics t LEFT JOIN rooms r ON r.topic_id = t.uuid \
         WHERE t.name LIKE ? ESCAPE '\\' \
         GROUP BY t.uuid, t.name \
         ORDER BY t.rowid",
    )
    .bind(contains(q))
    .fetch_all(pool)
    .await
}

const ROOM_OVERVIEW: &str = "SELECT r.uuid, r.name, r.description, \
    u.username AS host_name, t.name AS topic_name, r.created \
    FROM rooms r \
    JOIN users u ON u.uuid = r.host_id \
    JOIN topics t ON t.uuid = r.topic_id";

/// A room matches when q is a substring of its topic name, its own name, or
/// its description. Empty q matches every room. Message bodies are not
/// searched.
pub async fn search_rooms(pool: &SqlitePool, q: &str) -> sqlx::Result<Vec<RoomOverview>> {
    let pat = contains(q);
    sqlx::query_as(&format!(
        "{ROOM_OVERVIEW} \
         WHERE t.name LIKE ? ESCAPE '\\' \
            OR r.name LIKE ? ESCAPE '\\' \
            OR r.description LIKE ? ESCAPE '\\' \
         ORDER BY r.rowid"
    ))
    .bind(&pat)
    .bind(&pat)
    .bind(&pat)
    .fetch_all(pool)
    .await
}

pub async fn rooms_by_host(pool: &SqlitePool, host_id: &str) -> sqlx::Result<Vec<RoomOverview>> {
    sqlx::query_as(&format!("{ROOM_OVERVIEW} WHERE r.host_id=? ORDER BY r.rowid"))
        .bind(host_id)
        .fetch_all(pool)
        .await
}

pub async fn room_by_uuid(pool: &SqlitePool, uuid: &str) -> sqlx::Result<Option<Room>> {
    sqlx::query_as("SELECT * FROM rooms WHERE uuid=?")
        .bind(uuid)
        .fetch_optional(pool)
        .await
}

pub async fn room_overview(pool: &SqlitePool, uuid: &str) -> sqlx::Result<Option<RoomOverview>> {
    sqlx::query_as(&format!("{ROOM_OVERVIEW} WHERE r.uuid=?"))
        .bind(uuid)
        .fetch_optional(pool)
        .await
}

pub async fn create_room(
    pool: &SqlitePool,
    host_id: &str,
    topic_id: &str,
    name: &str,
    description: Option<&str>,
) -> sqlx::Result<String> {
    let uuid = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO rooms (uuid,host_id,topic_id,name,description) VALUES (?,?,?,?,?)")
        .bind(&uuid)
        .bind(host_id)
        .bind(topic_id)
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    Ok(uuid)
}

/// Edits touch topic and name only; the description keeps its original
/// value.
pub async fn update_room(
    pool: &SqlitePool,
    uuid: &str,
    topic_id: &str,
    name: &str,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE rooms SET topic_id=?, name=?, updated=CURRENT_TIMESTAMP WHERE uuid=?")
        .bind(topic_id)
        .bind(name)
        .bind(uuid)
        .execute(pool)
        .await?;
    Ok(())
}

/// Hard delete; messages and participant links go with it via the FK
/// cascade.
pub async fn delete_room(pool: &SqlitePool, uuid: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM rooms WHERE uuid=?")
        .bind(uuid)
        .execute(pool)
        .await?;
    Ok(())
}

const MESSAGE_OVERVIEW: &str = "SELECT m.uuid, m.body, m.created, \
    u.username AS author, r.uuid AS room_id, r.name AS room_name \
    FROM messages m \
    JOIN users u ON u.uuid = m.user_id \
    JOIN rooms r ON r.uuid = m.room_id";

pub async fn room_messages(pool: &SqlitePool, room_id: &str) -> sqlx::Result<Vec<MessageOverview>> {
    sqlx::query_as(&format!("{MESSAGE_OVERVIEW} WHERE m.room_id=? ORDER BY m.rowid"))
        .bind(room_id)
        .fetch_all(pool)
        .await
}

pub async fn messages_by_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<MessageOverview>> {
    sqlx::query_as(&format!("{MESSAGE_OVERVIEW} WHERE m.user_id=? ORDER BY m.rowid DESC"))
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Every message whose room's topic name contains q, for the home page's
/// activity panel. Independent of whether the room itself matched.
pub async fn messages_by_topic(pool: &SqlitePool, q: &str) -> sqlx::Result<Vec<MessageOverview>> {
    sqlx::query_as(&format!(
        "{MESSAGE_OVERVIEW} \
         JOIN topics t ON t.uuid = r.topic_id \
         WHERE t.name LIKE ? ESCAPE '\\' \
         ORDER BY m.rowid DESC"
    ))
    .bind(contains(q))
    .fetch_all(pool)
    .await
}

pub async fn activity(pool: &SqlitePool) -> sqlx::Result<Vec<MessageOverview>> {
    sqlx::query_as(&format!("{MESSAGE_OVERVIEW} ORDER BY m.rowid DESC"))
        .fetch_all(pool)
        .await
}

/// Inserting a message also enrolls its author into the room's participant
/// set; re-enrolling is a no-op.
pub async fn create_message(
    pool: &SqlitePool,
    room_id: &str,
    user_id: &str,
    body: &str,
) -> sqlx::Result<String> {
    let uuid = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO messages (uuid,room_id,user_id,body) VALUES (?,?,?,?)")
        .bind(&uuid)
        .bind(room_id)
        .bind(user_id)
        .bind(body)
        .execute(pool)
        .await?;
    sqlx::query("INSERT OR IGNORE INTO participants (room_id,user_id) VALUES (?,?)")
        .bind(room_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(uuid)
}

pub async fn message_by_uuid(pool: &SqlitePool, uuid: &str) -> sqlx::Result<Option<Message>> {
    sqlx::query_as("SELECT * FROM messages WHERE uuid=?")
        .bind(uuid)
        .fetch_optional(pool)
        .await
}

pub async fn delete_message(pool: &SqlitePool, uuid: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM messages WHERE uuid=?")
        .bind(uuid)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn participants(pool: &SqlitePool, room_id: &str) -> sqlx::Result<Vec<(String, String)>> {
    sqlx::query_as(
        "SELECT u.uuid, u.username FROM participants p \
         JOIN users u ON u.uuid = p.user_id \
         WHERE p.room_id=? ORDER BY u.username",
    )
    .bind(room_id)
    .fetch_all(pool)
    .await
}
