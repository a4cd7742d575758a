use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;

use serde_json::Value;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::{
    collection::{ItemAddress, SourceCollection},
    domain::ItemSchema,
    form::{
        CollectionError, DraftChange, DraftError, DraftForm, DraftFormFactory, ItemValidator,
    },
};

use super::{
    active::{ActiveItem, ActiveItemManager, CreationMethod, CreationMode},
    labels::{LabelResolver, SessionLabels},
    options::SessionOptions,
    outcome::{
        CancelOutcome, DismissOutcome, EditOutcome, OpenOutcome, SaveOutcome, SessionState,
    },
    shake::{DismissReason, ShakeSignal, is_dirty},
    view::SessionView,
};

/// Drives add/edit sessions for one array field.
///
/// All methods take `&self`; state lives in cells and no borrow is held
/// across an `.await`, so a cancel may run while a save is still validating.
/// Every open, cancel and commit advances `generation`; an async step that
/// resumes under a different generation must not touch the session.
pub struct EditSessionController<C, V> {
    collection: C,
    validator: V,
    schema: ItemSchema,
    options: SessionOptions,
    auto_save: Cell<bool>,
    active: Rc<ActiveItemManager>,
    draft: RefCell<Option<DraftForm>>,
    generation: Cell<u64>,
    /// Generation of an inserted-mode open still waiting on its placeholder.
    pending_open: Cell<Option<u64>>,
    promotion: Promotion,
    shake: ShakeSignal,
}

/// Deferred insertion of a draft-only item started by auto-save.
///
/// Recorded before the insert is awaited, so later edits of the same session
/// are held in `latest` and written into the new slot once it exists.
#[derive(Debug, Default)]
struct Promotion {
    in_flight: Cell<Option<u64>>,
    latest: RefCell<Option<Value>>,
    landed: Notify,
}

impl Promotion {
    fn is_running(&self, generation: u64) -> bool {
        self.in_flight.get() == Some(generation)
    }

    fn begin(&self, generation: u64) {
        self.in_flight.set(Some(generation));
        self.latest.borrow_mut().take();
    }

    fn hold(&self, value: Value) {
        *self.latest.borrow_mut() = Some(value);
    }

    fn take_latest(&self) -> Option<Value> {
        self.latest.borrow_mut().take()
    }

    fn end(&self, generation: u64) {
        if self.is_running(generation) {
            self.in_flight.set(None);
            self.latest.borrow_mut().take();
        }
        self.landed.notify_waiters();
    }

    async fn settled(&self, generation: u64) {
        while self.is_running(generation) {
            self.landed.notified().await;
        }
    }
}

impl<C, V> EditSessionController<C, V>
where
    C: SourceCollection,
    V: ItemValidator,
{
    pub fn new(collection: C, validator: V, active: Rc<ActiveItemManager>) -> Self {
        let options = SessionOptions::default();
        Self {
            collection,
            validator,
            schema: ItemSchema::from_items(Value::Object(Default::default())),
            auto_save: Cell::new(options.auto_save),
            shake: ShakeSignal::new(options.shake_duration),
            options,
            active,
            draft: RefCell::new(None),
            generation: Cell::new(0),
            pending_open: Cell::new(None),
            promotion: Promotion::default(),
        }
    }

    pub fn with_schema(mut self, schema: ItemSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.auto_save.set(options.auto_save);
        self.shake = ShakeSignal::new(options.shake_duration);
        self.options = options;
        self
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn active_items(&self) -> &Rc<ActiveItemManager> {
        &self.active
    }

    pub fn shake(&self) -> &ShakeSignal {
        &self.shake
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save.get()
    }

    /// Switches the commit policy. The open draft is regenerated on next
    /// access, dropping unsaved edits.
    pub fn set_auto_save(&self, enabled: bool) {
        if self.auto_save.replace(enabled) != enabled {
            debug!(enabled, "auto-save toggled");
        }
    }

    pub fn state(&self) -> SessionState {
        match self.active.active_item() {
            None => SessionState::Closed,
            Some(ActiveItem::Existing { .. }) => SessionState::OpenExisting,
            Some(ActiveItem::NewInserted { .. }) => SessionState::OpenNewInserted,
            Some(ActiveItem::NewDraftOnly { .. }) => SessionState::OpenNewDraftOnly,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub fn is_dirty(&self) -> bool {
        let draft = self.current_draft();
        is_dirty(self.auto_save(), draft.as_deref())
    }

    pub fn should_shake(&self) -> bool {
        self.shake.is_active()
    }

    /// Snapshot of the draft value, materializing the draft if needed.
    pub fn draft_value(&self) -> Option<Value> {
        self.current_draft()?.draft().cloned()
    }

    /// Clone of the whole draft container, including field errors.
    pub fn draft_snapshot(&self) -> Option<DraftForm> {
        self.current_draft().map(|draft| draft.clone())
    }

    pub fn labels(&self) -> Option<SessionLabels> {
        let item = self.active.active_item()?;
        Some(LabelResolver::resolve(
            self.schema.title(),
            self.schema.description(),
            item.is_new(),
            self.auto_save(),
            item.address().slot(),
        ))
    }

    pub fn view(&self) -> Option<SessionView> {
        let item = self.active.active_item()?;
        let labels = self.labels()?;
        let draft = self.draft_snapshot()?;
        Some(SessionView {
            state: self.state(),
            address: item.address(),
            title: labels.title,
            description: labels.description,
            is_dirty: is_dirty(self.auto_save(), Some(&draft)),
            should_shake: self.should_shake(),
            host: self.options.host,
            errors: draft.errors().clone(),
            draft: draft.into_value(),
        })
    }

    pub fn open_existing(&self, index: usize) -> OpenOutcome {
        if index >= self.collection.len() {
            debug!(index, len = self.collection.len(), "open ignored: no such item");
            return OpenOutcome::Ignored;
        }
        self.begin();
        self.active.set_active_item(ActiveItem::Existing { index });
        self.current_draft();
        OpenOutcome::Opened {
            state: SessionState::OpenExisting,
            address: ItemAddress::Slot(index),
        }
    }

    /// Starts a new item using the configured creation mode and method.
    pub async fn open_new(&self) -> OpenOutcome {
        let method = self.options.creation_method;
        let initial = self.initial_value();
        let generation = self.begin();
        match self.options.creation_mode {
            CreationMode::Inserted => {
                let placeholder = initial.unwrap_or(Value::Null);
                self.pending_open.set(Some(generation));
                let inserted = self.insert(method, placeholder).await;
                if self.pending_open.get() == Some(generation) {
                    self.pending_open.set(None);
                }
                let index = match inserted {
                    Ok(index) => index,
                    Err(error) => {
                        warn!(%error, ?method, "placeholder insertion failed");
                        return OpenOutcome::Failed;
                    }
                };
                if self.generation.get() != generation {
                    debug!(index, "placeholder inserted after session changed; removing");
                    self.remove_quietly(index).await;
                    return OpenOutcome::Superseded;
                }
                self.active
                    .set_active_item(ActiveItem::NewInserted { index, method });
                self.current_draft();
                OpenOutcome::Opened {
                    state: SessionState::OpenNewInserted,
                    address: ItemAddress::Slot(index),
                }
            }
            CreationMode::DraftOnly => {
                self.active.set_active_item(ActiveItem::NewDraftOnly {
                    method,
                    seed: initial,
                });
                self.current_draft();
                OpenOutcome::Opened {
                    state: SessionState::OpenNewDraftOnly,
                    address: ItemAddress::Pending,
                }
            }
        }
    }

    pub async fn edit_pointer(&self, pointer: &str, value: Value) -> EditOutcome {
        self.apply_edit(|draft| draft.set_pointer(pointer, value)).await
    }

    pub async fn remove_pointer(&self, pointer: &str) -> EditOutcome {
        self.apply_edit(|draft| draft.remove_pointer(pointer)).await
    }

    pub async fn replace_draft(&self, value: Value) -> EditOutcome {
        self.apply_edit(|draft| Ok(draft.replace(value))).await
    }

    /// Validates the draft and, on success, commits it and closes.
    pub async fn save(&self) -> SaveOutcome {
        if !self.is_open() {
            debug!("save ignored: no open session");
            return SaveOutcome::NoSession;
        }
        let candidate = self.draft_value().unwrap_or(Value::Null);
        let generation = self.generation.get();

        let result = self.validator.validate(&candidate).await;
        if self.generation.get() != generation {
            debug!(generation, "discarding stale validation result");
            return SaveOutcome::Superseded;
        }
        if let Err(issues) = result {
            debug!(issues = issues.len(), "draft failed validation");
            if let Some(mut draft) = self.current_draft() {
                draft.set_errors(&issues);
            }
            return SaveOutcome::Invalid { issues };
        }

        // Edits made while validating may have promoted a draft-only item.
        self.promotion.settled(generation).await;
        if self.generation.get() != generation {
            debug!(generation, "session changed while auto-save insertion landed");
            return SaveOutcome::Superseded;
        }
        let Some(item) = self.active.active_item() else {
            return SaveOutcome::Superseded;
        };
        let commit_generation = self.advance();

        let written = self.auto_save() && !matches!(item, ActiveItem::NewDraftOnly { .. });
        let index = if written {
            item.address().slot()
        } else {
            self.commit(&item, candidate).await
        };
        self.finish(item.address(), commit_generation);
        SaveOutcome::Saved { index }
    }

    /// Closes without validation, removing any placeholder this session
    /// inserted.
    pub async fn cancel(&self) -> CancelOutcome {
        let Some(item) = self.active.active_item() else {
            if self.pending_open.take() == Some(self.generation.get()) {
                self.advance();
                debug!("cancelled before the placeholder landed");
                return CancelOutcome::Cancelled { removed: None };
            }
            debug!("cancel ignored: no open session");
            return CancelOutcome::NoSession;
        };
        let generation = self.advance();
        self.finish(item.address(), generation);
        let removed = match item {
            ActiveItem::NewInserted { index, .. } => {
                self.remove_quietly(index).await;
                Some(index)
            }
            ActiveItem::Existing { .. } | ActiveItem::NewDraftOnly { .. } => None,
        };
        CancelOutcome::Cancelled { removed }
    }

    /// Outside clicks, escape and backdrop all route here. A dirty draft
    /// refuses and shakes; otherwise this is a cancel.
    pub async fn dismiss(&self, reason: DismissReason) -> DismissOutcome {
        if !self.is_open() {
            return DismissOutcome::NoSession;
        }
        if self.is_dirty() {
            debug!(?reason, "dismissal refused: unsaved changes");
            self.shake.trigger();
            return DismissOutcome::Refused;
        }
        DismissOutcome::Closed(self.cancel().await)
    }

    async fn apply_edit(
        &self,
        edit: impl FnOnce(&mut DraftForm) -> Result<DraftChange, DraftError>,
    ) -> EditOutcome {
        let change = {
            let Some(mut draft) = self.current_draft() else {
                return EditOutcome::NoSession;
            };
            match edit(&mut draft) {
                Ok(change) => change,
                Err(error) => return EditOutcome::Rejected(error),
            }
        };
        let revision = change.revision;
        if self.auto_save() {
            self.write_through(change).await;
        }
        EditOutcome::Applied { revision }
    }

    /// Propagates an auto-save edit. A draft-only item is inserted on its
    /// first edit and continues as an inserted item.
    async fn write_through(&self, change: DraftChange) {
        let value = change.value.unwrap_or(Value::Null);
        let generation = self.generation.get();
        if self.promotion.is_running(generation) {
            self.promotion.hold(value);
            return;
        }
        let Some(item) = self.active.active_item() else {
            return;
        };
        match item {
            ActiveItem::Existing { index } | ActiveItem::NewInserted { index, .. } => {
                if let Err(error) = self.collection.set(index, value).await {
                    warn!(index, %error, "auto-save write-through failed");
                }
            }
            ActiveItem::NewDraftOnly { method, .. } => {
                self.promotion.begin(generation);
                self.promote(method, value, generation).await;
                self.promotion.end(generation);
            }
        }
    }

    async fn promote(&self, method: CreationMethod, value: Value, generation: u64) {
        let index = match self.insert(method, value).await {
            Ok(index) => index,
            Err(error) => {
                warn!(%error, ?method, "deferred auto-save insertion failed");
                return;
            }
        };
        if self.generation.get() != generation {
            debug!(index, "auto-save insertion landed after session closed; removing");
            self.remove_quietly(index).await;
            return;
        }
        self.active
            .set_active_item(ActiveItem::NewInserted { index, method });
        let address = ItemAddress::Slot(index);
        let key = DraftFormFactory::key(&self.collection, address, self.auto_save());
        if let Some(draft) = self.draft.borrow_mut().as_mut() {
            draft.rekey(key);
        }
        debug!(index, "draft-only item promoted by auto-save");

        while self.generation.get() == generation
            && let Some(latest) = self.promotion.take_latest()
        {
            if let Err(error) = self.collection.set(index, latest).await {
                warn!(index, %error, "auto-save write-through failed");
            }
        }
    }

    /// Writes a validated draft into the collection. Returns the slot the
    /// item ended up in.
    async fn commit(&self, item: &ActiveItem, value: Value) -> Option<usize> {
        match item {
            ActiveItem::Existing { index } | ActiveItem::NewInserted { index, .. } => {
                if let Err(error) = self.collection.set(*index, value).await {
                    warn!(index, %error, "commit failed");
                }
                Some(*index)
            }
            ActiveItem::NewDraftOnly { method, .. } => match self.insert(*method, value).await {
                Ok(index) => Some(index),
                Err(error) => {
                    warn!(%error, ?method, "deferred insertion failed");
                    None
                }
            },
        }
    }

    async fn insert(&self, method: CreationMethod, value: Value) -> Result<usize, CollectionError> {
        match method {
            CreationMethod::Append => {
                let index = self.collection.len();
                self.collection.append(value).await?;
                Ok(index)
            }
            CreationMethod::Prepend => {
                self.collection.prepend(value).await?;
                Ok(0)
            }
        }
    }

    async fn remove_quietly(&self, index: usize) {
        if let Err(error) = self.collection.remove(index).await {
            warn!(index, %error, "failed to remove placeholder item");
        }
    }

    fn initial_value(&self) -> Option<Value> {
        self.options
            .initial_value
            .clone()
            .or_else(|| self.schema.default_item().cloned())
    }

    /// Resets per-session state ahead of a new open.
    fn begin(&self) -> u64 {
        if let Some(address) = self.active.active_index() {
            debug!(?address, "replacing open session");
        }
        self.draft.borrow_mut().take();
        self.shake.reset();
        self.advance()
    }

    fn advance(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }

    fn finish(&self, address: ItemAddress, generation: u64) {
        if self.generation.get() != generation {
            return;
        }
        if self.active.remove_active_item(address) {
            self.draft.borrow_mut().take();
            self.shake.reset();
        }
    }

    /// The draft for the active item, regenerated whenever the collection
    /// identity, address or auto-save flag no longer matches.
    fn current_draft(&self) -> Option<RefMut<'_, DraftForm>> {
        let item = self.active.active_item()?;
        let auto_save = self.auto_save();
        let key = DraftFormFactory::key(&self.collection, item.address(), auto_save);
        let mut slot = self.draft.borrow_mut();
        if slot.as_ref().map(DraftForm::key) != Some(key) {
            if slot.is_some() {
                debug!(address = ?item.address(), "draft inputs changed; regenerating");
            }
            *slot = Some(DraftFormFactory::create(
                &self.collection,
                item.address(),
                item.draft_seed(),
                auto_save,
            ));
        }
        RefMut::filter_map(slot, Option::as_mut).ok()
    }
}
