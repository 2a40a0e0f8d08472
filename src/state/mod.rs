//! Kern datastructuren voor een vertaling: entiteit → veld → waarde.

use std::collections::BTreeMap;
use std::fmt;

pub mod convert;
pub mod expr;
pub mod map;
pub mod value;

use expr::{GpiExpr, TagExpr};

/// Identifier voor een entiteit binnen de vertaling.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityName(pub String);

impl From<&str> for EntityName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for EntityName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier voor een veld binnen een entiteit of shape.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FieldName(pub String);

impl From<&str> for FieldName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for FieldName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Veld binnen een entiteit: een los expressieveld of een genest shape-veld.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldExpr<N> {
    /// Veld met een directe waarde.
    Simple(TagExpr<N>),
    /// Veld met een geneste shape.
    Gpi(GpiExpr<N>),
    /// Onbekend veldtype van de wire; fataal zodra een conversie het raakt.
    Unknown {
        tag: String,
        raw: serde_json::Value,
    },
}

/// Veldenwoordenboek van één entiteit.
pub type FieldDict<N> = BTreeMap<FieldName, FieldExpr<N>>;

/// Volledige vertaling: entiteitsnaam → veldenwoordenboek.
///
/// De vertaling bezit alle geneste structuren exclusief; conversies leveren
/// altijd een verse, onafhankelijke vertaling op.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation<N> {
    entities: BTreeMap<EntityName, FieldDict<N>>,
}

impl<N> Default for Translation<N> {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }
}

impl<N> Translation<N> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bouwt een vertaling rechtstreeks uit een entiteitenmap. De keys van
    /// de map zijn per constructie uniek.
    #[must_use]
    pub fn from_entities(entities: BTreeMap<EntityName, FieldDict<N>>) -> Self {
        Self { entities }
    }

    /// Voeg een veld toe aan een entiteit; de entiteit wordt aangemaakt als
    /// die nog niet bestaat. Dubbele veldnamen zijn een fout.
    pub fn insert_field(
        &mut self,
        entity: impl Into<EntityName>,
        field: impl Into<FieldName>,
        expr: FieldExpr<N>,
    ) -> Result<(), TranslationError> {
        let entity = entity.into();
        let field = field.into();
        let fields = self.entities.entry(entity.clone()).or_default();
        if fields.contains_key(&field) {
            return Err(TranslationError::DuplicateField { entity, field });
        }
        fields.insert(field, expr);
        Ok(())
    }

    #[must_use]
    pub fn entity(&self, name: &EntityName) -> Option<&FieldDict<N>> {
        self.entities.get(name)
    }

    #[must_use]
    pub fn field(&self, entity: &EntityName, field: &FieldName) -> Option<&FieldExpr<N>> {
        self.entities.get(entity).and_then(|fields| fields.get(field))
    }

    /// Itereert over alle entiteiten in deterministische volgorde.
    pub fn entities(&self) -> impl Iterator<Item = (&EntityName, &FieldDict<N>)> {
        self.entities.iter()
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &EntityName> {
        self.entities.keys()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Fouten die kunnen optreden bij het opbouwen van een vertaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    DuplicateField {
        entity: EntityName,
        field: FieldName,
    },
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateField { entity, field } => {
                write!(f, "veld `{field}` bestaat al op entiteit `{entity}`")
            }
        }
    }
}

impl std::error::Error for TranslationError {}
