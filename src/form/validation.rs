use std::collections::{BTreeMap, BTreeSet};

use gpui::SharedString;

use super::controller::{
    FieldKey, FormController, FormResult, SyncFieldValidatorFn, ValidationMode,
    first_declared_error, read_lock, write_lock,
};
use super::rules::{self, FieldIssue, FieldSpec};

pub trait ValidationError: Clone + Send + Sync + 'static {
    fn message(&self) -> SharedString;
}

pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// The fixed set of declared fields, in declaration order.
    fn field_specs() -> Vec<FieldSpec> {
        Vec::new()
    }

    /// Current text of a declared field, `None` for undeclared keys.
    fn field_text(&self, _key: FieldKey) -> Option<&str> {
        None
    }
}

pub trait FieldValidator<T, L, E>: Send + Sync
where
    L: FieldLens<T>,
    E: ValidationError,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E>;
}

impl<T, L, E, F> FieldValidator<T, L, E> for F
where
    L: FieldLens<T>,
    E: ValidationError,
    F: for<'a> Fn(&'a T, &'a L::Value) -> Result<(), E> + Send + Sync,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E> {
        (self)(model, value)
    }
}

impl<T, E> FormController<T, E>
where
    T: FormModel,
    E: ValidationError + From<FieldIssue>,
{
    /// Adds a rule that runs after the declared rules of the same field.
    pub fn register_field_validator<L, V>(&self, lens: L, validator: V) -> FormResult<()>
    where
        L: FieldLens<T>,
        V: FieldValidator<T, L, E> + 'static,
    {
        let key = lens.key();
        let validator = std::sync::Arc::new(validator);
        let wrapped: SyncFieldValidatorFn<T, E> =
            std::sync::Arc::new(move |model: &T| validator.validate(model, lens.get(model)));
        let mut validators = write_lock(&self.field_validators, "registering field validator")?;
        validators.entry(key).or_default().push(wrapped);
        Ok(())
    }

    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        {
            let mut state = write_lock(&self.state, "writing form model")?;
            lens.set(&mut state.model, value);
            let is_dirty = lens.get(&state.model) != lens.get(&state.initial_model);
            if is_dirty {
                state.dirty_fields.insert(key);
            } else {
                state.dirty_fields.remove(&key);
            }
            state.ensure_meta(key).dirty = is_dirty;
        }

        if self.options.validate_mode == ValidationMode::OnChange {
            let _ = self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    /// User typed into a field: store the value and drop its stale error.
    pub fn input<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        self.set(lens, value)?;
        if self.options.clear_error_on_input
            && self.options.validate_mode != ValidationMode::OnChange
        {
            self.clear_field_errors(lens.key())?;
        }
        Ok(())
    }

    pub fn touch<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        self.blur(lens.key())
    }

    /// Field lost focus. Marks it touched and validates it in `OnBlur` mode.
    pub fn blur(&self, key: FieldKey) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "touching field")?;
            state.ensure_meta(key).touched = true;
        }

        if self.options.validate_mode == ValidationMode::OnBlur {
            let _ = self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    pub fn validate_field<L>(&self, lens: L) -> FormResult<bool>
    where
        L: FieldLens<T>,
    {
        self.validate_field_by_key(lens.key())
    }

    /// Runs every declared field and every registered validator. All fields
    /// are evaluated so every problem is visible after one pass.
    pub fn validate_form(&self) -> FormResult<bool> {
        let model = {
            read_lock(&self.state, "reading model for form validation")?
                .model
                .clone()
        };
        let field_validators = read_lock(
            &self.field_validators,
            "reading field validators for form validation",
        )?
        .clone();

        let mut keys = T::field_specs()
            .iter()
            .map(|spec| spec.key)
            .collect::<BTreeSet<_>>();
        keys.extend(field_validators.keys().copied());

        let mut field_errors = BTreeMap::<FieldKey, Vec<E>>::new();
        for key in keys {
            let validators = field_validators.get(&key).map(Vec::as_slice);
            field_errors.insert(key, self.collect_errors(&model, key, validators));
        }

        let mut state = write_lock(&self.state, "applying form validation result")?;
        let mut all_keys = state
            .field_meta
            .keys()
            .copied()
            .collect::<BTreeSet<FieldKey>>();
        all_keys.extend(field_errors.keys().copied());
        for key in all_keys {
            state.ensure_meta(key).errors = field_errors.remove(&key).unwrap_or_default();
        }
        state.first_error = first_declared_error(&state);
        Ok(state
            .field_meta
            .values()
            .all(|meta| meta.errors.is_empty()))
    }

    pub(super) fn validate_field_by_key(&self, key: FieldKey) -> FormResult<bool> {
        let model = {
            read_lock(&self.state, "reading model for field validation")?
                .model
                .clone()
        };
        let validators = {
            read_lock(
                &self.field_validators,
                "reading field validators for key validation",
            )?
            .get(&key)
            .cloned()
            .unwrap_or_default()
        };

        let errors = self.collect_errors(&model, key, Some(validators.as_slice()));

        let mut state = write_lock(&self.state, "writing field validation result")?;
        let meta = state.ensure_meta(key);
        let is_valid = errors.is_empty();
        meta.errors = errors;
        state.first_error = first_declared_error(&state);
        Ok(is_valid)
    }

    /// A field holds at most one error: the first declared rule that fails,
    /// otherwise the first registered validator that fails.
    fn collect_errors(
        &self,
        model: &T,
        key: FieldKey,
        validators: Option<&[SyncFieldValidatorFn<T, E>]>,
    ) -> Vec<E> {
        let declared = T::field_specs().into_iter().find(|spec| spec.key == key);
        if let Some(spec) = declared {
            let text = model.field_text(key).unwrap_or_default();
            if let Err(issue) = rules::evaluate(&spec, text).into_result() {
                return vec![E::from(issue)];
            }
        }

        validators
            .unwrap_or_default()
            .iter()
            .find_map(|validator| validator(model).err())
            .into_iter()
            .collect()
    }
}
