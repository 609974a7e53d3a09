//! Editor state for the create and modify screens.

use crate::model::schema::{FieldError, FieldInput, PropDescriptor, Schema};
use crate::model::SaveRecord;
use crate::remote::Values;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("a save name is required")]
    MissingName,
    #[error("choose a server version")]
    MissingVersion,
    #[error("{label}: {source}")]
    Invalid {
        row: usize,
        label: String,
        #[source]
        source: FieldError,
    },
}

impl FormError {
    /// Row to focus so the operator lands on the offending input.
    pub fn row(&self) -> usize {
        match self {
            FormError::MissingName => CreateForm::NAME_ROW,
            FormError::MissingVersion => CreateForm::VERSION_ROW,
            FormError::Invalid { row, .. } => *row,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub prop: PropDescriptor,
    pub input: FieldInput,
}

impl FormField {
    pub fn label(&self) -> &str {
        if self.prop.label.is_empty() {
            &self.prop.key
        } else {
            &self.prop.label
        }
    }

    pub fn display(&self) -> String {
        self.prop.kind.display(&self.input)
    }
}

/// Property inputs in display order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropForm {
    fields: Vec<FormField>,
}

impl PropForm {
    fn new(props: Vec<PropDescriptor>, input: impl Fn(&PropDescriptor) -> FieldInput) -> Self {
        let fields = props
            .into_iter()
            .map(|prop| FormField {
                input: input(&prop),
                prop,
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validated `values` map, or the first invalid field offset by
    /// `first_row` rows.
    fn values(&self, first_row: usize) -> Result<Values, FormError> {
        let mut values = Values::new();
        for (i, field) in self.fields.iter().enumerate() {
            let value = field
                .prop
                .kind
                .validate(&field.input)
                .map_err(|source| FormError::Invalid {
                    row: first_row + i,
                    label: field.label().to_string(),
                    source,
                })?;
            values.insert(field.prop.key.clone(), value);
        }
        Ok(values)
    }

    fn edit(&mut self, i: usize, f: impl FnOnce(&mut String)) {
        if let Some(field) = self.fields.get_mut(i)
            && field.prop.kind.is_text()
            && let FieldInput::Text(buf) = &mut field.input
        {
            f(buf);
        }
    }

    fn is_text(&self, i: usize) -> bool {
        self.fields.get(i).is_some_and(|f| f.prop.kind.is_text())
    }

    fn cycle(&mut self, i: usize, forward: bool) {
        if let Some(field) = self.fields.get_mut(i) {
            field.prop.kind.cycle(&mut field.input, forward);
        }
    }
}

fn wrap(focus: usize, rows: usize, forward: bool) -> usize {
    if rows == 0 {
        0
    } else if forward {
        (focus + 1) % rows
    } else {
        (focus + rows - 1) % rows
    }
}

/// A focused row in the create form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateRow {
    Name,
    Version,
    Prop(usize),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateForm {
    pub name: String,
    pub version: String,
    props: PropForm,
    focus: usize,
}

impl CreateForm {
    pub const NAME_ROW: usize = 0;
    pub const VERSION_ROW: usize = 1;

    /// Fresh form with schema defaults for every create property.
    pub fn from_schema(schema: &Schema) -> Self {
        Self {
            props: PropForm::new(schema.create_fields(), |p| p.kind.default_input()),
            ..Self::default()
        }
    }

    pub fn props(&self) -> &PropForm {
        &self.props
    }

    pub fn rows(&self) -> usize {
        2 + self.props.len()
    }

    pub fn focus(&self) -> CreateRow {
        match self.focus {
            Self::NAME_ROW => CreateRow::Name,
            Self::VERSION_ROW => CreateRow::Version,
            n => CreateRow::Prop(n - 2),
        }
    }

    pub fn focus_row(&self) -> usize {
        self.focus
    }

    pub fn set_focus(&mut self, row: usize) {
        self.focus = row.min(self.rows() - 1);
    }

    pub fn move_focus(&mut self, forward: bool) {
        self.focus = wrap(self.focus, self.rows(), forward);
    }

    pub fn insert_char(&mut self, c: char) {
        match self.focus() {
            CreateRow::Name => self.name.push(c),
            CreateRow::Version => self.version.push(c),
            CreateRow::Prop(i) => self.props.edit(i, |buf| buf.push(c)),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus() {
            CreateRow::Name => {
                self.name.pop();
            }
            CreateRow::Version => {
                self.version.pop();
            }
            CreateRow::Prop(i) => self.props.edit(i, |buf| {
                buf.pop();
            }),
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        if let CreateRow::Prop(i) = self.focus() {
            self.props.cycle(i, forward);
        }
    }

    /// True when the focused row takes typed text.
    pub fn focus_takes_text(&self) -> bool {
        match self.focus() {
            CreateRow::Name | CreateRow::Version => true,
            CreateRow::Prop(i) => self.props.is_text(i),
        }
    }

    /// `(name, version, values)` ready for `create_save`.
    pub fn build(&self) -> Result<(String, String, Values), FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        let version = self.version.trim();
        if version.is_empty() {
            return Err(FormError::MissingVersion);
        }
        let values = self.props.values(2)?;
        Ok((name.to_string(), version.to_string(), values))
    }
}

/// Every writable property of one save.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifyForm {
    target: String,
    props: PropForm,
    focus: usize,
}

impl ModifyForm {
    /// Populates every input from the save's current metadata.
    pub fn for_save(schema: &Schema, save: &SaveRecord) -> Self {
        Self {
            target: save.name.clone(),
            props: PropForm::new(schema.write_fields(), |p| {
                p.kind.input_from_value(save.metadata.get(&p.key))
            }),
            focus: 0,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn props(&self) -> &PropForm {
        &self.props
    }

    pub fn focus_row(&self) -> usize {
        self.focus
    }

    pub fn set_focus(&mut self, row: usize) {
        self.focus = row.min(self.props.len().saturating_sub(1));
    }

    pub fn move_focus(&mut self, forward: bool) {
        self.focus = wrap(self.focus, self.props.len(), forward);
    }

    pub fn insert_char(&mut self, c: char) {
        self.props.edit(self.focus, |buf| buf.push(c));
    }

    pub fn backspace(&mut self) {
        self.props.edit(self.focus, |buf| {
            buf.pop();
        });
    }

    pub fn cycle(&mut self, forward: bool) {
        self.props.cycle(self.focus, forward);
    }

    pub fn focus_takes_text(&self) -> bool {
        self.props.is_text(self.focus)
    }

    pub fn build(&self) -> Result<Values, FormError> {
        self.props.values(0)
    }
}
