use rust_decimal::Decimal;

use super::door::{Accessory, Casing, Crown, Door, Extension, LineItem, ProductRef};
use super::Order;
use crate::dimensions::{suggest_range, CasingFormula, CasingType, Deriver};
use crate::error::{OrderError, Result};
use crate::pricing::DiscountEdit;

/// Edit capability of the caller, resolved from configuration up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    role: String,
    can_edit: bool,
}

impl Access {
    pub fn new(role: impl Into<String>, can_edit: bool) -> Self {
        Self {
            role: role.into(),
            can_edit,
        }
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit
    }

    pub fn ensure_can_edit(&self) -> Result<()> {
        if self.can_edit {
            Ok(())
        } else {
            Err(OrderError::ReadOnly(self.role.clone()))
        }
    }
}

/// Door fields supplied when adding a door.
#[derive(Debug, Clone, Default)]
pub struct DoorSpec {
    pub model: Option<ProductRef>,
    pub price: Decimal,
    pub quantity: u32,
    pub width: Decimal,
    pub height: Decimal,
    pub material: Option<String>,
    pub color: Option<String>,
    pub glass_type: Option<u64>,
    pub threshold: Option<u64>,
}

/// Which casing range a formula2 casing should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeChoice {
    #[default]
    Unset,
    Id(u64),
    /// Pick the range covering the door dimension the casing runs along.
    Auto,
}

#[derive(Debug, Clone)]
pub struct CasingSpec {
    pub model: Option<ProductRef>,
    pub price: Decimal,
    pub quantity: u32,
    pub casing_type: CasingType,
    pub formula: CasingFormula,
    pub range: RangeChoice,
}

/// Mutations of a draft order. Holding one proves the caller may edit.
pub struct OrderEditor<'a> {
    order: &'a mut Order,
    deriver: Deriver<'a>,
}

impl<'a> OrderEditor<'a> {
    pub fn new(order: &'a mut Order, access: &Access, deriver: Deriver<'a>) -> Result<Self> {
        access.ensure_can_edit()?;
        Ok(Self { order, deriver })
    }

    pub fn order(&self) -> &Order {
        self.order
    }

    /// Appends a door and returns its 1-based index.
    pub fn add_door(&mut self, spec: DoorSpec) -> usize {
        self.order.doors.push(Door {
            model: spec.model,
            price: spec.price,
            quantity: spec.quantity,
            height: spec.height,
            width: spec.width,
            material: spec.material,
            color: spec.color,
            glass_type: spec.glass_type,
            threshold: spec.threshold,
            ..Door::default()
        });
        tracing::debug!(order = %self.order.number, "door added");
        self.order.doors.len()
    }

    /// Changes door dimensions and recomputes everything mounted on it.
    pub fn resize_door(
        &mut self,
        door: usize,
        width: Option<Decimal>,
        height: Option<Decimal>,
    ) -> Result<()> {
        let deriver = self.deriver;
        let target = self.order.door_mut(door)?;
        if let Some(width) = width {
            target.width = width;
        }
        if let Some(height) = height {
            target.height = height;
        }
        deriver.rederive_door(target);
        tracing::debug!(
            order = %self.order.number,
            door,
            "door resized, accessories rederived"
        );
        Ok(())
    }

    pub fn remove_door(&mut self, door: usize) -> Result<Door> {
        self.order.door(door)?;
        Ok(self.order.doors.remove(door - 1))
    }

    pub fn add_casing(&mut self, door: usize, spec: CasingSpec) -> Result<usize> {
        let deriver = self.deriver;
        let target = self.order.door_mut(door)?;

        let mut casing = Casing::new(spec.casing_type, spec.formula);
        casing.model = spec.model;
        casing.price = spec.price;
        casing.quantity = spec.quantity;
        if spec.formula == CasingFormula::FromRange {
            casing.casing_range =
                resolve_range(&deriver, spec.range, spec.casing_type, target)?;
        }

        deriver.derive_casing(&mut casing, target.width, target.height);
        target.casings.push(casing);
        Ok(target.casings.len())
    }

    pub fn switch_casing_formula(
        &mut self,
        door: usize,
        casing: usize,
        formula: CasingFormula,
        range: RangeChoice,
    ) -> Result<()> {
        let deriver = self.deriver;
        let target = self.order.door_mut(door)?;
        let casing_type = item_at(&target.casings, door, casing)?.casing_type;

        let range = match formula {
            CasingFormula::FromDoor => None,
            CasingFormula::FromRange => resolve_range(&deriver, range, casing_type, target)?,
        };

        let (width, height) = (target.width, target.height);
        let entry = &mut target.casings[casing - 1];
        deriver.switch_formula(entry, formula, range, width, height);
        Ok(())
    }

    pub fn add_crown(&mut self, door: usize, mut crown: Crown) -> Result<usize> {
        let deriver = self.deriver;
        let target = self.order.door_mut(door)?;
        deriver.derive_crown(&mut crown, target.width);
        target.crowns.push(crown);
        Ok(target.crowns.len())
    }

    pub fn add_extension(&mut self, door: usize, extension: Extension) -> Result<usize> {
        let target = self.order.door_mut(door)?;
        target.extensions.push(extension);
        Ok(target.extensions.len())
    }

    pub fn add_accessory(&mut self, door: usize, accessory: Accessory) -> Result<usize> {
        let target = self.order.door_mut(door)?;
        target.accessories.push(accessory);
        Ok(target.accessories.len())
    }

    pub fn edit_discount(&mut self, edit: DiscountEdit) {
        self.order.apply_discount_edit(edit);
    }
}

fn item_at<T: LineItem>(items: &[T], door: usize, index: usize) -> Result<&T> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .ok_or(OrderError::LineItemNotFound {
            kind: T::KIND,
            door,
            index,
            count: items.len(),
        })
}

fn resolve_range(
    deriver: &Deriver<'_>,
    choice: RangeChoice,
    casing_type: CasingType,
    door: &Door,
) -> Result<Option<u64>> {
    match choice {
        RangeChoice::Unset => Ok(None),
        RangeChoice::Id(id) => deriver
            .range(id)
            .map(|range| Some(range.id))
            .ok_or(OrderError::CasingRangeNotFound(id)),
        RangeChoice::Auto => {
            suggest_range(deriver.ranges(), casing_type, door.width, door.height)
                .map(|range| Some(range.id))
                .ok_or_else(|| OrderError::NoMatchingRange {
                    size: match casing_type {
                        CasingType::Side => door.height.to_string(),
                        CasingType::Straight => door.width.to_string(),
                    },
                    casing_type: casing_type.to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::{CasingRange, DimensionSettings};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn settings() -> DimensionSettings {
        DimensionSettings {
            casing_size: dec!(6),
            crown_size: dec!(10),
        }
    }

    fn ranges() -> Vec<CasingRange> {
        vec![CasingRange {
            id: 3,
            min_size: dec!(150),
            max_size: dec!(220),
            casing_size: dec!(58),
        }]
    }

    fn order() -> Order {
        Order::new(
            "ORD-2026-0001".to_string(),
            "Acme".to_string(),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        )
    }

    fn editor_access() -> Access {
        Access::new("manager", true)
    }

    fn door_spec() -> DoorSpec {
        DoorSpec {
            quantity: 1,
            width: dec!(80),
            height: dec!(200),
            ..DoorSpec::default()
        }
    }

    fn casing_spec(casing_type: CasingType, formula: CasingFormula, range: RangeChoice) -> CasingSpec {
        CasingSpec {
            model: None,
            price: Decimal::ZERO,
            quantity: 1,
            casing_type,
            formula,
            range,
        }
    }

    #[test]
    fn read_only_access_cannot_open_an_editor() {
        let settings = settings();
        let mut order = order();
        let access = Access::new("viewer", false);

        let result = OrderEditor::new(&mut order, &access, Deriver::new(&settings, &[]));

        assert!(matches!(result, Err(OrderError::ReadOnly(role)) if role == "viewer"));
    }

    #[test]
    fn resizing_a_door_rederives_casings_and_crowns() {
        let settings = settings();
        let ranges = ranges();
        let mut order = order();
        let access = editor_access();
        let mut editor = OrderEditor::new(&mut order, &access, Deriver::new(&settings, &ranges)).unwrap();

        let door = editor.add_door(door_spec());
        editor
            .add_casing(door, casing_spec(CasingType::Side, CasingFormula::FromDoor, RangeChoice::Unset))
            .unwrap();
        editor
            .add_casing(door, casing_spec(CasingType::Straight, CasingFormula::FromDoor, RangeChoice::Unset))
            .unwrap();
        editor.add_crown(door, Crown::default()).unwrap();

        let d = &editor.order().doors[0];
        assert_eq!(d.casings[0].height, dec!(206));
        assert_eq!(d.casings[1].height, dec!(92));
        assert_eq!(d.crowns[0].width, dec!(90));

        editor.resize_door(door, Some(dec!(90)), None).unwrap();

        let d = &editor.order().doors[0];
        assert_eq!(d.casings[0].height, dec!(206));
        assert_eq!(d.casings[1].height, dec!(102));
        assert_eq!(d.crowns[0].width, dec!(100));
    }

    #[test]
    fn formula2_with_auto_range_matches_door_height() {
        let settings = settings();
        let ranges = ranges();
        let mut order = order();
        let access = editor_access();
        let mut editor = OrderEditor::new(&mut order, &access, Deriver::new(&settings, &ranges)).unwrap();

        let door = editor.add_door(door_spec());
        editor
            .add_casing(door, casing_spec(CasingType::Side, CasingFormula::FromRange, RangeChoice::Auto))
            .unwrap();

        let casing = &editor.order().doors[0].casings[0];
        assert_eq!(casing.casing_range, Some(3));
        assert_eq!(casing.height, dec!(58));
        assert_eq!(casing.width, dec!(6));
    }

    #[test]
    fn auto_range_without_a_match_is_an_error() {
        let settings = settings();
        let ranges = ranges();
        let mut order = order();
        let access = editor_access();
        let mut editor = OrderEditor::new(&mut order, &access, Deriver::new(&settings, &ranges)).unwrap();

        let door = editor.add_door(door_spec());
        let err = editor
            .add_casing(door, casing_spec(CasingType::Straight, CasingFormula::FromRange, RangeChoice::Auto))
            .unwrap_err();

        assert!(matches!(err, OrderError::NoMatchingRange { .. }));
    }

    #[test]
    fn unknown_range_id_is_rejected() {
        let settings = settings();
        let ranges = ranges();
        let mut order = order();
        let access = editor_access();
        let mut editor = OrderEditor::new(&mut order, &access, Deriver::new(&settings, &ranges)).unwrap();

        let door = editor.add_door(door_spec());
        let err = editor
            .add_casing(door, casing_spec(CasingType::Side, CasingFormula::FromRange, RangeChoice::Id(42)))
            .unwrap_err();

        assert!(matches!(err, OrderError::CasingRangeNotFound(42)));
    }

    #[test]
    fn switching_back_to_formula1_clears_the_range() {
        let settings = settings();
        let ranges = ranges();
        let mut order = order();
        let access = editor_access();
        let mut editor = OrderEditor::new(&mut order, &access, Deriver::new(&settings, &ranges)).unwrap();

        let door = editor.add_door(door_spec());
        editor
            .add_casing(door, casing_spec(CasingType::Side, CasingFormula::FromRange, RangeChoice::Id(3)))
            .unwrap();
        assert_eq!(editor.order().doors[0].casings[0].height, dec!(58));

        editor
            .switch_casing_formula(door, 1, CasingFormula::FromDoor, RangeChoice::Unset)
            .unwrap();

        let casing = &editor.order().doors[0].casings[0];
        assert_eq!(casing.casing_formula, CasingFormula::FromDoor);
        assert_eq!(casing.casing_range, None);
        assert_eq!(casing.height, dec!(206));
    }

    #[test]
    fn missing_casing_index_reports_kind_and_count() {
        let settings = settings();
        let mut order = order();
        let access = editor_access();
        let mut editor = OrderEditor::new(&mut order, &access, Deriver::new(&settings, &[])).unwrap();

        let door = editor.add_door(door_spec());
        let err = editor
            .switch_casing_formula(door, 2, CasingFormula::FromDoor, RangeChoice::Unset)
            .unwrap_err();

        assert_eq!(err.to_string(), "Casing #2 not found on door #1 (it has 0)");
    }

    #[test]
    fn removing_a_door_shifts_the_rest() {
        let settings = settings();
        let mut order = order();
        let access = editor_access();
        let mut editor = OrderEditor::new(&mut order, &access, Deriver::new(&settings, &[])).unwrap();

        editor.add_door(door_spec());
        editor.add_door(DoorSpec {
            width: dec!(90),
            ..door_spec()
        });
        let removed = editor.remove_door(1).unwrap();

        assert_eq!(removed.width, dec!(80));
        assert_eq!(editor.order().doors.len(), 1);
        assert_eq!(editor.order().doors[0].width, dec!(90));
        assert!(editor.remove_door(5).is_err());
    }
}
