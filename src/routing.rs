//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, patch, post, put},
};

use crate::{
    AppState, Error,
    auth::{auth_guard, post_log_in, post_log_out, register_user},
    budget::{
        create_budget_endpoint, delete_budget_endpoint, edit_budget_endpoint,
        get_all_budgets_endpoint, get_user_budgets_endpoint, update_budget_limit_endpoint,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, edit_expense_endpoint,
        get_expense_endpoint, get_user_expenses_endpoint, upload_receipt_endpoint,
    },
    income::{
        create_income_endpoint, delete_income_endpoint, edit_income_endpoint,
        get_all_incomes_endpoint, get_income_by_id_endpoint, get_user_incomes_endpoint,
    },
    profile::{
        change_password_endpoint, delete_account_endpoint, get_current_user_endpoint,
        get_profile_endpoint, update_profile_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Unknown paths get a 404 and known paths requested with the wrong method
/// get a 405, both with the usual JSON error body.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::REGISTER, json_route(post(register_user)))
        .route(endpoints::LOG_IN, json_route(post(post_log_in)))
        .route(endpoints::LOG_OUT, json_route(post(post_log_out)));

    let protected_routes = Router::new()
        .route(
            endpoints::CURRENT_USER,
            json_route(get(get_current_user_endpoint)),
        )
        .route(
            endpoints::PROFILE,
            json_route(
                get(get_profile_endpoint)
                    .put(update_profile_endpoint)
                    .delete(delete_account_endpoint),
            ),
        )
        .route(endpoints::PASSWORD, json_route(put(change_password_endpoint)))
        .route(
            endpoints::BUDGETS,
            json_route(get(get_all_budgets_endpoint).post(create_budget_endpoint)),
        )
        .route(endpoints::EDIT_BUDGET, json_route(post(edit_budget_endpoint)))
        .route(
            endpoints::DELETE_BUDGET,
            json_route(post(delete_budget_endpoint)),
        )
        .route(
            endpoints::USER_BUDGETS,
            json_route(get(get_user_budgets_endpoint)),
        )
        .route(
            endpoints::BUDGET_LIMIT,
            json_route(patch(update_budget_limit_endpoint)),
        )
        .route(
            endpoints::EXPENSES,
            json_route(get(get_user_expenses_endpoint).post(create_expense_endpoint)),
        )
        .route(
            endpoints::EXPENSE,
            json_route(
                get(get_expense_endpoint)
                    .put(edit_expense_endpoint)
                    .delete(delete_expense_endpoint),
            ),
        )
        .route(
            endpoints::EXPENSE_RECEIPT,
            json_route(put(upload_receipt_endpoint)),
        )
        .route(
            endpoints::INCOMES,
            json_route(get(get_all_incomes_endpoint).post(create_income_endpoint)),
        )
        .route(
            endpoints::INCOME_BY_ID,
            json_route(get(get_income_by_id_endpoint)),
        )
        .route(endpoints::EDIT_INCOME, json_route(post(edit_income_endpoint)))
        .route(
            endpoints::DELETE_INCOME,
            json_route(post(delete_income_endpoint)),
        )
        .route(
            endpoints::USER_INCOMES,
            json_route(get(get_user_incomes_endpoint)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Answer requests with an unsupported method with a JSON 405 response.
fn json_route(method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router.fallback(method_not_allowed)
}

async fn method_not_allowed() -> Response {
    Error::MethodNotAllowed.into_response()
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;

    use crate::{
        ErrorBody, endpoints,
        test_utils::{get_test_server, register_and_log_in},
    };

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (server, _) = get_test_server();

        let response = server.get("/api/nothing/here").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "The requested resource could not be found."
        );
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let (server, _) = get_test_server();

        let response = server.get(endpoints::REGISTER).await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "Invalid request method."
        );
    }

    #[tokio::test]
    async fn protected_routes_require_session() {
        let (server, _) = get_test_server();

        for path in [
            endpoints::PROFILE,
            endpoints::USER_BUDGETS,
            endpoints::EXPENSES,
            endpoints::USER_INCOMES,
        ] {
            let response = server.get(path).await;

            assert_eq!(
                response.status_code(),
                StatusCode::UNAUTHORIZED,
                "want 401 for {path}"
            );
            assert_eq!(
                response.json::<ErrorBody>().message,
                "Authentication required."
            );
        }
    }

    #[tokio::test]
    async fn wrong_method_on_protected_route_is_405() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server
            .delete(endpoints::USER_INCOMES)
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }
}
