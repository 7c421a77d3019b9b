mod common;

use common::{acme, count_rows, employee, globex};
use firmbook_core::db::open_db_in_memory;
use firmbook_core::{
    CompanyService, EmployeeInput, EmployeeService, EntityKey, RepoError, ServiceError,
};

#[test]
fn company_is_created_with_every_employee() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = CompanyService::try_new(&mut conn).unwrap();

    let created = service
        .create_company(
            &acme(),
            &[employee("Jo", "jo@x.com"), employee("Al", "al@x.com")],
        )
        .unwrap();
    let company_id = created.company.id().unwrap();

    assert_eq!(created.employees.len(), 2);
    assert!(created
        .employees
        .iter()
        .all(|employee| employee.company_id() == Some(company_id)));
    assert_eq!(service.list_company_employees(company_id).unwrap().len(), 2);
}

#[test]
fn invalid_dependent_rolls_back_the_whole_unit() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = CompanyService::try_new(&mut conn).unwrap();
        let bad = EmployeeInput {
            email: Some("not-an-email".to_string()),
            ..employee("Al", "")
        };

        let err = service
            .create_company(&acme(), &[employee("Jo", "jo@x.com"), bad])
            .unwrap_err();
        match err {
            ServiceError::Validation(errors) => {
                assert!(errors.has_field("employees[1].email"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    assert_eq!(count_rows(&conn, "company"), 0);
    assert_eq!(count_rows(&conn, "employee"), 0);
}

#[test]
fn invalid_parent_fails_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = CompanyService::try_new(&mut conn).unwrap();
        let mut input = acme();
        input.nip = None;

        let err = service
            .create_company(&input, &[employee("Jo", "jo@x.com")])
            .unwrap_err();
        assert_eq!(err.code(), "validation_failed");
    }
    assert_eq!(count_rows(&conn, "company"), 0);
}

#[test]
fn duplicate_email_inside_a_batch_rolls_back_everything() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = CompanyService::try_new(&mut conn).unwrap();
        let err = service
            .create_company(
                &acme(),
                &[employee("Jo", "jo@x.com"), employee("Jo", "jo@x.com")],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Persistence(RepoError::ConstraintViolation(_))
        ));
        assert_eq!(err.code(), "constraint_violation");
        assert!(service.coordinator().tracker().is_empty());
    }

    assert_eq!(count_rows(&conn, "company"), 0);
    assert_eq!(count_rows(&conn, "employee"), 0);
}

#[test]
fn duplicate_nip_is_a_constraint_violation() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = CompanyService::try_new(&mut conn).unwrap();
    service.create_company(&acme(), &[]).unwrap();

    let mut clone = globex();
    clone.nip = acme().nip;
    let err = service.create_company(&clone, &[]).unwrap_err();
    assert_eq!(err.code(), "constraint_violation");
    assert_eq!(service.list_companies().unwrap().len(), 1);
}

#[test]
fn reassigning_to_a_missing_company_leaves_reference_unchanged() {
    let mut conn = open_db_in_memory().unwrap();
    let (company_id, employee_id) = {
        let mut service = CompanyService::try_new(&mut conn).unwrap();
        let created = service
            .create_company(&acme(), &[employee("Jo", "jo@x.com")])
            .unwrap();
        (
            created.company.id().unwrap(),
            created.employees[0].id().unwrap(),
        )
    };

    let mut service = EmployeeService::try_new(&mut conn).unwrap();
    let err = service.assign_company(employee_id, 9_999).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(key) if key == EntityKey::company(9_999)));
    assert_eq!(
        service.get_employee(employee_id).unwrap().company_id(),
        Some(company_id)
    );

    let err = service.assign_company(4_242, company_id).unwrap_err();
    assert_eq!(err.to_string(), "employee with id 4242 not found");
}

#[test]
fn reassigning_moves_the_employee_once() {
    let mut conn = open_db_in_memory().unwrap();
    let (employee_id, globex_id) = {
        let mut service = CompanyService::try_new(&mut conn).unwrap();
        let created = service
            .create_company(&acme(), &[employee("Jo", "jo@x.com")])
            .unwrap();
        let globex = service.create_company(&globex(), &[]).unwrap();
        (
            created.employees[0].id().unwrap(),
            globex.company.id().unwrap(),
        )
    };

    let mut service = EmployeeService::try_new(&mut conn).unwrap();
    assert!(service.assign_company(employee_id, globex_id).unwrap());
    assert!(!service.assign_company(employee_id, globex_id).unwrap());
    assert_eq!(
        service.get_employee(employee_id).unwrap().company_id(),
        Some(globex_id)
    );
}

#[test]
fn deleting_a_company_detaches_its_employees() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = CompanyService::try_new(&mut conn).unwrap();
    let created = service
        .create_company(
            &acme(),
            &[employee("Jo", "jo@x.com"), employee("Al", "al@x.com")],
        )
        .unwrap();
    let company_id = created.company.id().unwrap();

    assert_eq!(service.delete_company(company_id).unwrap(), 2);
    assert!(matches!(
        service.get_company(company_id),
        Err(ServiceError::NotFound(_))
    ));

    let coordinator = service.coordinator();
    for created_employee in &created.employees {
        let stored = coordinator
            .load_employee(created_employee.id().unwrap())
            .unwrap();
        assert_eq!(stored.company_id(), None);
        assert!(!coordinator.is_dirty(&stored));
    }
}

#[test]
fn deleting_a_missing_company_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = CompanyService::try_new(&mut conn).unwrap();
    let err = service.delete_company(77).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(key) if key == EntityKey::company(77)));
}

#[test]
fn adding_employees_requires_an_existing_company() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = EmployeeService::try_new(&mut conn).unwrap();

    let err = service
        .add_employees_to_company(5, &[employee("Jo", "jo@x.com")])
        .unwrap_err();
    assert_eq!(err.code(), "not_found");

    let err = service
        .create_employee(&employee("Jo", "jo@x.com"), Some(5))
        .unwrap_err();
    assert_eq!(err.to_string(), "company with id 5 not found");
    assert!(service.list_employees().unwrap().is_empty());
}

#[test]
fn employees_can_be_added_to_an_existing_company() {
    let mut conn = open_db_in_memory().unwrap();
    let company_id = {
        let mut service = CompanyService::try_new(&mut conn).unwrap();
        service.create_company(&acme(), &[]).unwrap().company.id().unwrap()
    };

    let mut service = EmployeeService::try_new(&mut conn).unwrap();
    let added = service
        .add_employees_to_company(
            company_id,
            &[employee("Jo", "jo@x.com"), employee("Al", "al@x.com")],
        )
        .unwrap();
    assert_eq!(added.len(), 2);

    service.delete_employee(added[0].id().unwrap()).unwrap();
    assert_eq!(service.list_employees().unwrap().len(), 1);
    assert!(matches!(
        service.delete_employee(added[0].id().unwrap()),
        Err(ServiceError::NotFound(_))
    ));
}
