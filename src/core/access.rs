//! Role-based visibility rules

use crate::core::fund::{Fund, FundId, FundOwner};
use crate::core::role::Role;

/// Whether `role` may see an asset, given the fund the asset is assigned to
/// (`None` for an unassigned asset).
///
/// Partners see unassigned assets plus their own fund and the two shared
/// funds. External owners see nothing.
pub fn can_see_asset(role: &Role, fund_id: Option<FundId>) -> bool {
    match role {
        Role::Admin => true,
        Role::PartnerOne => matches!(
            fund_id,
            None | Some(FundId::Cha10) | Some(FundId::Bhph) | Some(FundId::Caps)
        ),
        Role::PartnerTwo => matches!(
            fund_id,
            None | Some(FundId::Tra10) | Some(FundId::Bhph) | Some(FundId::Caps)
        ),
        Role::Owner(_) => false,
    }
}

/// Whether `role` may see a fund. Partners see the funds they own alone or
/// jointly; external owners see none.
pub fn can_see_fund(role: &Role, fund: &Fund) -> bool {
    match role {
        Role::Admin => true,
        Role::PartnerOne => matches!(
            fund.owner,
            FundOwner::PartnerOne | FundOwner::BothPartners
        ),
        Role::PartnerTwo => matches!(
            fund.owner,
            FundOwner::PartnerTwo | FundOwner::BothPartners
        ),
        Role::Owner(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::FundCatalog;

    #[test]
    fn test_admin_sees_every_asset() {
        for fund in [
            None,
            Some(FundId::Cha10),
            Some(FundId::Tra10),
            Some(FundId::Bhph),
            Some(FundId::Caps),
            Some(FundId::Cos10),
            Some(FundId::Disabled),
        ] {
            assert!(can_see_asset(&Role::Admin, fund));
        }
    }

    #[test]
    fn test_partner_asset_visibility() {
        let one = Role::PartnerOne;
        assert!(can_see_asset(&one, None));
        assert!(can_see_asset(&one, Some(FundId::Cha10)));
        assert!(can_see_asset(&one, Some(FundId::Bhph)));
        assert!(can_see_asset(&one, Some(FundId::Caps)));
        assert!(!can_see_asset(&one, Some(FundId::Tra10)));
        assert!(!can_see_asset(&one, Some(FundId::Cos10)));

        let two = Role::PartnerTwo;
        assert!(can_see_asset(&two, None));
        assert!(can_see_asset(&two, Some(FundId::Tra10)));
        assert!(!can_see_asset(&two, Some(FundId::Cha10)));
    }

    #[test]
    fn test_external_owner_sees_nothing() {
        let owner = Role::Owner("External Owner 1".to_string());
        assert!(!can_see_asset(&owner, None));
        assert!(!can_see_asset(&owner, Some(FundId::Bhph)));

        let catalog = FundCatalog::standard();
        assert!(catalog.iter().all(|f| !can_see_fund(&owner, f)));
    }

    #[test]
    fn test_fund_visibility() {
        let catalog = FundCatalog::standard();

        let admin_visible = catalog
            .iter()
            .filter(|f| can_see_fund(&Role::Admin, f))
            .count();
        assert_eq!(admin_visible, catalog.len());

        let one_visible: Vec<FundId> = catalog
            .iter()
            .filter(|f| can_see_fund(&Role::PartnerOne, f))
            .map(|f| f.id)
            .collect();
        assert_eq!(one_visible, vec![FundId::Cha10, FundId::Bhph, FundId::Caps]);

        let two_visible: Vec<FundId> = catalog
            .iter()
            .filter(|f| can_see_fund(&Role::PartnerTwo, f))
            .map(|f| f.id)
            .collect();
        assert_eq!(two_visible, vec![FundId::Tra10, FundId::Bhph, FundId::Caps]);
    }
}
