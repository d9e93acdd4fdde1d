//! Note service
//!
//! The `NoteService` is the entry point for every note operation. It owns
//! the note store, checks that the caller owns the note before mutating or
//! exporting it, and stamps `last_modified` on every successful mutation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut service = NoteService::open(&config)?;
//! let owner = OwnerId::parse("alice")?;
//!
//! let note = service.create(&owner, NewNote::new("Groceries", "milk, eggs"))?;
//! let found = service.search(&owner, "egg")?;
//! ```

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{NoteError, NoteResult};
use crate::models::{NewNote, Note, NoteUpdate, OwnerId};
use crate::search::SearchQuery;
use crate::storage::NoteRepository;

/// Owner-checked note operations over a note store
pub struct NoteService {
    repo: NoteRepository,
}

impl NoteService {
    pub fn new(repo: NoteRepository) -> Self {
        Self { repo }
    }

    /// Open the on-disk store described by `config`
    pub fn open(config: &Config) -> NoteResult<Self> {
        Ok(Self::new(NoteRepository::open(config)?))
    }

    /// Service over an in-memory store (for testing)
    pub fn in_memory() -> NoteResult<Self> {
        Ok(Self::new(NoteRepository::open_in_memory()?))
    }

    /// All notes of `owner`, most recently modified first
    pub fn list(&self, owner: &OwnerId) -> NoteResult<Vec<Note>> {
        Ok(self.repo.list_by_owner(owner)?)
    }

    /// Notes of `owner` carrying `tag`
    pub fn list_by_tag(&self, owner: &OwnerId, tag: &str) -> NoteResult<Vec<Note>> {
        Ok(self.repo.list_by_owner_and_tag(owner, tag)?)
    }

    /// Create a note owned by `owner`
    pub fn create(&mut self, owner: &OwnerId, new: NewNote) -> NoteResult<Note> {
        let note = Note::new(owner.clone(), new);
        self.repo.insert(&note)?;
        info!("Created note {} for {}", note.id, owner);
        Ok(note)
    }

    /// Get a note by id, regardless of owner
    pub fn get(&self, id: Uuid) -> NoteResult<Note> {
        self.repo.get(id)?.ok_or_else(|| NoteError::not_found(id))
    }

    /// Get a note by id, failing unless `owner` owns it
    pub fn get_owned(&self, id: Uuid, owner: &OwnerId) -> NoteResult<Note> {
        let note = self.get(id)?;
        if !note.is_owned_by(owner) {
            warn!("{} denied access to note {}", owner, id);
            return Err(NoteError::Unauthorized);
        }
        Ok(note)
    }

    /// Apply a partial update to a note owned by `owner`
    pub fn update(&mut self, id: Uuid, owner: &OwnerId, update: NoteUpdate) -> NoteResult<Note> {
        let mut note = self.get_owned(id, owner)?;
        note.apply(update);

        // Deleted between the read and the write
        if !self.repo.replace(&note)? {
            return Err(NoteError::not_found(id));
        }

        debug!("Updated note {} at {}", id, note.last_modified);
        Ok(note)
    }

    /// Permanently delete a note owned by `owner`
    pub fn delete(&mut self, id: Uuid, owner: &OwnerId) -> NoteResult<()> {
        self.get_owned(id, owner)?;
        if !self.repo.remove(id)? {
            return Err(NoteError::not_found(id));
        }
        info!("Deleted note {}", id);
        Ok(())
    }

    /// Notes of `owner` whose title or content contains `query`
    pub fn search(&self, owner: &OwnerId, query: &str) -> NoteResult<Vec<Note>> {
        let notes = self.repo.list_by_owner(owner)?;
        Ok(SearchQuery::new(query).filter(notes))
    }

    /// Tags of `owner` with usage counts, most used first
    pub fn tags(&self, owner: &OwnerId) -> NoteResult<Vec<(String, i64)>> {
        Ok(self.repo.tags_with_counts(owner)?)
    }

    /// Total number of stored notes across all owners
    pub fn note_count(&self) -> NoteResult<i64> {
        Ok(self.repo.note_count()?)
    }
}

/// Parse a note id from a request path
///
/// Anything that is not a UUID cannot name a note, so it is reported as
/// not found rather than as a validation failure.
pub fn parse_note_id(raw: &str) -> NoteResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| NoteError::not_found(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn alice() -> OwnerId {
        OwnerId::parse("alice").unwrap()
    }

    fn bob() -> OwnerId {
        OwnerId::parse("bob").unwrap()
    }

    fn service() -> NoteService {
        NoteService::in_memory().unwrap()
    }

    fn ids(notes: &[Note]) -> HashSet<Uuid> {
        notes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_create_then_get() {
        let mut service = service();
        let created = service
            .create(&alice(), NewNote::new("Title", "Content"))
            .unwrap();

        let found = service.get(created.id).unwrap();
        assert_eq!(found.title, "Title");
        assert_eq!(found.content, "Content");
        assert!(!found.id.to_string().is_empty());
        assert_eq!(found.owner, alice());
    }

    #[test]
    fn test_create_with_empty_fields() {
        let mut service = service();
        let created = service.create(&alice(), NewNote::default()).unwrap();
        let found = service.get(created.id).unwrap();
        assert_eq!(found.title, "");
        assert_eq!(found.content, "");
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let service = service();
        assert!(matches!(
            service.get(Uuid::new_v4()),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_by_other_owner_is_unauthorized_and_unchanged() {
        let mut service = service();
        let created = service
            .create(&alice(), NewNote::new("Mine", "Secret"))
            .unwrap();

        let result = service.update(created.id, &bob(), NoteUpdate::title("Stolen"));
        assert!(matches!(result, Err(NoteError::Unauthorized)));

        let found = service.get(created.id).unwrap();
        assert_eq!(found, created);
    }

    #[test]
    fn test_update_unknown_is_not_found() {
        let mut service = service();
        let result = service.update(Uuid::new_v4(), &alice(), NoteUpdate::title("x"));
        assert!(matches!(result, Err(NoteError::NotFound(_))));
    }

    #[test]
    fn test_update_content_only_keeps_title() {
        let mut service = service();
        let created = service
            .create(&alice(), NewNote::new("Title", "Old"))
            .unwrap();

        let updated = service
            .update(created.id, &alice(), NoteUpdate::content("New"))
            .unwrap();
        assert_eq!(updated.title, "Title");
        assert_eq!(updated.content, "New");
        assert_eq!(service.get(created.id).unwrap(), updated);
    }

    #[test]
    fn test_update_title_only_keeps_content() {
        let mut service = service();
        let created = service
            .create(&alice(), NewNote::new("Old", "Body"))
            .unwrap();

        let updated = service
            .update(created.id, &alice(), NoteUpdate::title("New"))
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "Body");
    }

    #[test]
    fn test_update_with_empty_string_clears_field() {
        let mut service = service();
        let created = service
            .create(&alice(), NewNote::new("Title", "Body"))
            .unwrap();

        let updated = service
            .update(created.id, &alice(), NoteUpdate::content(""))
            .unwrap();
        assert_eq!(updated.content, "");
        assert_eq!(service.get(created.id).unwrap().content, "");
    }

    #[test]
    fn test_last_modified_strictly_increases() {
        let mut service = service();
        let created = service.create(&alice(), NewNote::new("t", "c")).unwrap();

        let mut previous = created.last_modified;
        for i in 0..10 {
            let updated = service
                .update(created.id, &alice(), NoteUpdate::content(format!("v{}", i)))
                .unwrap();
            assert!(updated.last_modified > previous);
            previous = updated.last_modified;
        }
        assert_eq!(service.get(created.id).unwrap().last_modified, previous);
    }

    #[test]
    fn test_update_tags() {
        let mut service = service();
        let created = service.create(&alice(), NewNote::new("t", "c")).unwrap();

        let updated = service
            .update(
                created.id,
                &alice(),
                NoteUpdate {
                    tags: Some(vec!["b".to_string(), "a".to_string(), "a".to_string()]),
                    ..NoteUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.tags, vec!["a", "b"]);
        assert_eq!(service.list_by_tag(&alice(), "a").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let mut service = service();
        let created = service.create(&alice(), NewNote::new("t", "c")).unwrap();

        service.delete(created.id, &alice()).unwrap();
        assert!(matches!(
            service.get(created.id),
            Err(NoteError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(created.id, &alice()),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_by_other_owner_is_unauthorized() {
        let mut service = service();
        let created = service.create(&alice(), NewNote::new("t", "c")).unwrap();

        assert!(matches!(
            service.delete(created.id, &bob()),
            Err(NoteError::Unauthorized)
        ));
        assert!(service.get(created.id).is_ok());
    }

    #[test]
    fn test_list_ordered_by_last_modified_desc() {
        let mut service = service();
        let first = service.create(&alice(), NewNote::new("first", "")).unwrap();
        let second = service.create(&alice(), NewNote::new("second", "")).unwrap();

        // Touching the first note moves it to the front
        service
            .update(first.id, &alice(), NoteUpdate::content("edited"))
            .unwrap();

        let notes = service.list(&alice()).unwrap();
        assert_eq!(notes[0].id, first.id);
        assert_eq!(notes[1].id, second.id);
        assert!(notes[0].last_modified >= notes[1].last_modified);
    }

    #[test]
    fn test_empty_search_equals_list() {
        let mut service = service();
        for title in ["one", "two", "three"] {
            service.create(&alice(), NewNote::new(title, "")).unwrap();
        }
        service.create(&bob(), NewNote::new("other", "")).unwrap();

        let listed = service.list(&alice()).unwrap();
        let searched = service.search(&alice(), "").unwrap();
        assert_eq!(ids(&listed), ids(&searched));
        assert_eq!(listed.len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut service = service();
        let hello = service
            .create(&alice(), NewNote::new("Greeting", "Hello World"))
            .unwrap();
        service
            .create(&alice(), NewNote::new("Other", "nothing here"))
            .unwrap();

        let found = service.search(&alice(), "hello").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, hello.id);
    }

    #[test]
    fn test_groceries_scenario() {
        let mut service = service();
        let groceries = service
            .create(&alice(), NewNote::new("Groceries", "milk, eggs"))
            .unwrap();
        service
            .create(&alice(), NewNote::new("Todo", "call mom"))
            .unwrap();

        let found = service.search(&alice(), "egg").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, groceries.id);
    }

    #[test]
    fn test_owners_never_cross_appear() {
        let mut service = service();
        let a = service
            .create(&alice(), NewNote::new("Same", "identical content"))
            .unwrap();
        let b = service
            .create(&bob(), NewNote::new("Same", "identical content"))
            .unwrap();

        let alice_list = service.list(&alice()).unwrap();
        let bob_list = service.list(&bob()).unwrap();
        assert_eq!(ids(&alice_list), HashSet::from([a.id]));
        assert_eq!(ids(&bob_list), HashSet::from([b.id]));

        let alice_found = service.search(&alice(), "identical").unwrap();
        let bob_found = service.search(&bob(), "identical").unwrap();
        assert_eq!(ids(&alice_found), HashSet::from([a.id]));
        assert_eq!(ids(&bob_found), HashSet::from([b.id]));
    }

    #[test]
    fn test_get_owned() {
        let mut service = service();
        let created = service.create(&alice(), NewNote::new("t", "c")).unwrap();

        assert!(service.get_owned(created.id, &alice()).is_ok());
        assert!(matches!(
            service.get_owned(created.id, &bob()),
            Err(NoteError::Unauthorized)
        ));
    }

    #[test]
    fn test_tags_scoped_to_owner() {
        let mut service = service();
        service
            .create(
                &alice(),
                NewNote::new("a", "").with_tags(vec!["work".to_string()]),
            )
            .unwrap();
        service
            .create(&bob(), NewNote::new("b", "").with_tags(vec!["home".to_string()]))
            .unwrap();

        assert_eq!(
            service.tags(&alice()).unwrap(),
            vec![("work".to_string(), 1)]
        );
    }

    #[test]
    fn test_parse_note_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_note_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_note_id("not-a-uuid"),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn test_open_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let id = {
            let mut service = NoteService::open(&config).unwrap();
            service
                .create(&alice(), NewNote::new("Persistent", "Body"))
                .unwrap()
                .id
        };

        let service = NoteService::open(&config).unwrap();
        assert_eq!(service.get(id).unwrap().title, "Persistent");
        assert_eq!(service.note_count().unwrap(), 1);
    }
}
