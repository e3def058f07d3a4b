//! Router swaps: buy with native value, sell to native, token approval.
//!
//! A sell is approve → swap token for wrapped native → unwrap. The unwrap
//! step is skipped when the swap leaves no wrapped balance.

use alloy::primitives::{Address, U256};

use crate::batch::classify::Operation;
use crate::batch::eligibility::{InputError, Selection, SwapJob};
use crate::batch::events::{BatchEvent, BatchSummary, RowTable};
use crate::batch::orchestrator::{BatchOrchestrator, SwapRoute};
use crate::batch::rows::{BalanceState, RowStatus};
use crate::blockchain::contracts::{approve_request, unwrap_request, Erc20, SwapCall};
use crate::blockchain::{BlockchainResult, Wallet};

const TABLE: RowTable = RowTable::Swaps;

/// `percent` of `balance`, rounded down, without intermediate overflow.
pub fn percent_of(balance: U256, percent: u8) -> U256 {
    let percent = U256::from(percent);
    let hundred = U256::from(100u8);
    balance / hundred * percent + balance % hundred * percent / hundred
}

impl BatchOrchestrator {
    /// Buy `token` with each row's native amount.
    pub async fn run_buys(
        &self,
        token: Address,
        selection: Selection<SwapJob>,
    ) -> Result<BatchSummary, InputError> {
        let route = self.settings.route()?.clone();
        self.reject(TABLE, &selection.rejected);
        if selection.is_empty() {
            return Err(InputError::NoEligibleRows);
        }

        let delay = self.settings.transfer_delay;
        Ok(self
            .run_pass(Operation::Buy, selection.jobs, delay, |job| {
                self.buy_one(&route, token, job)
            })
            .await)
    }

    /// Sell `percent` of each row's `token` balance for native currency.
    pub async fn run_sells(
        &self,
        token: Address,
        percent: u8,
        selection: Selection<SwapJob>,
    ) -> Result<BatchSummary, InputError> {
        if percent == 0 || percent > 100 {
            return Err(InputError::InvalidPercent(percent));
        }
        let route = self.settings.route()?.clone();
        self.reject(TABLE, &selection.rejected);
        if selection.is_empty() {
            return Err(InputError::NoEligibleRows);
        }

        let delay = self.settings.transfer_delay;
        Ok(self
            .run_pass(Operation::Sell, selection.jobs, delay, |job| {
                self.sell_one(&route, token, percent, job)
            })
            .await)
    }

    /// Approve the router to spend each row's `token` balance.
    pub async fn run_approvals(
        &self,
        token: Address,
        selection: Selection<SwapJob>,
    ) -> Result<BatchSummary, InputError> {
        let route = self.settings.route()?.clone();
        self.reject(TABLE, &selection.rejected);
        if selection.is_empty() {
            return Err(InputError::NoEligibleRows);
        }

        let delay = self.settings.transfer_delay;
        Ok(self
            .run_pass(Operation::Approve, selection.jobs, delay, |job| {
                self.approve_one(&route, token, job)
            })
            .await)
    }

    async fn buy_one(&self, route: &SwapRoute, token: Address, job: SwapJob) -> bool {
        self.set_status(TABLE, job.index, RowStatus::Processing);

        let from = job.wallet.address();
        let swap = SwapCall {
            router: route.router,
            token_in: route.wrapped_native,
            token_out: token,
            fee_tier: route.fee_tier,
            recipient: from,
            amount_in: job.amount_in,
            amount_out_minimum: route.amount_out_minimum,
            value: job.amount_in,
        };

        let result = self
            .execute(
                TABLE,
                job.index,
                &job.wallet,
                swap.into_request(from),
                self.settings.gas.swap_gas_limit,
                RowStatus::Pending,
            )
            .await;

        match result {
            Ok(tx_hash) => {
                self.set_status(TABLE, job.index, RowStatus::Success(tx_hash));
                self.refresh_row_balances(job.index, token, from).await;
                true
            }
            Err(e) => {
                self.fail(TABLE, job.index, Operation::Buy, &e);
                false
            }
        }
    }

    async fn sell_one(&self, route: &SwapRoute, token: Address, percent: u8, job: SwapJob) -> bool {
        self.set_status(TABLE, job.index, RowStatus::Processing);

        match self.sell_steps(route, token, percent, &job.wallet, job.index).await {
            Ok(status) => {
                let ok = status.is_success();
                self.set_status(TABLE, job.index, status);
                if ok {
                    self.refresh_row_balances(job.index, token, job.wallet.address())
                        .await;
                }
                ok
            }
            Err(e) => {
                self.fail(TABLE, job.index, Operation::Sell, &e);
                false
            }
        }
    }

    async fn sell_steps(
        &self,
        route: &SwapRoute,
        token: Address,
        percent: u8,
        wallet: &Wallet,
        index: usize,
    ) -> BlockchainResult<RowStatus> {
        let from = wallet.address();
        let client = self.client.as_ref();

        let balance = Erc20::new(client, token).balance_of(from).await?;
        let amount_in = percent_of(balance, percent);
        if amount_in.is_zero() {
            return Ok(RowStatus::Error("No tokens to sell".to_string()));
        }
        tracing::info!(row = index, %amount_in, percent, "Selling tokens");

        self.set_status(TABLE, index, RowStatus::Approving);
        let allowance = if route.unlimited_approval {
            U256::MAX
        } else {
            amount_in
        };
        self.execute(
            TABLE,
            index,
            wallet,
            approve_request(from, token, route.router, allowance),
            self.settings.gas.approve_gas_limit,
            RowStatus::ApprovalPending,
        )
        .await?;

        self.set_status(TABLE, index, RowStatus::Swapping);
        let swap = SwapCall {
            router: route.router,
            token_in: token,
            token_out: route.wrapped_native,
            fee_tier: route.fee_tier,
            recipient: from,
            amount_in,
            amount_out_minimum: route.amount_out_minimum,
            value: U256::ZERO,
        };
        self.execute(
            TABLE,
            index,
            wallet,
            swap.into_request(from),
            self.settings.gas.swap_gas_limit,
            RowStatus::SwapPending,
        )
        .await?;

        let wrapped = Erc20::new(client, route.wrapped_native)
            .balance_of(from)
            .await?;
        if wrapped.is_zero() {
            tracing::info!(row = index, "No wrapped balance after swap");
            return Ok(RowStatus::NoConversionNeeded);
        }

        self.execute(
            TABLE,
            index,
            wallet,
            unwrap_request(from, route.wrapped_native, wrapped),
            self.settings.gas.unwrap_gas_limit,
            RowStatus::Unwrapping,
        )
        .await?;

        Ok(RowStatus::Sold { percent })
    }

    async fn approve_one(&self, route: &SwapRoute, token: Address, job: SwapJob) -> bool {
        self.set_status(TABLE, job.index, RowStatus::Approving);

        let from = job.wallet.address();
        let amount = Erc20::new(self.client.as_ref(), token)
            .balance_of(from)
            .await
            .map(|held| {
                if route.unlimited_approval && !held.is_zero() {
                    U256::MAX
                } else {
                    held
                }
            });

        let amount = match amount {
            Ok(amount) if amount.is_zero() => {
                self.set_status(
                    TABLE,
                    job.index,
                    RowStatus::Error("No tokens to approve".to_string()),
                );
                return false;
            }
            Ok(amount) => amount,
            Err(e) => {
                self.fail(TABLE, job.index, Operation::Approve, &e);
                return false;
            }
        };

        let result = self
            .execute(
                TABLE,
                job.index,
                &job.wallet,
                approve_request(from, token, route.router, amount),
                self.settings.gas.approve_gas_limit,
                RowStatus::ApprovalPending,
            )
            .await;

        match result {
            Ok(_) => {
                self.set_status(TABLE, job.index, RowStatus::Approved);
                true
            }
            Err(e) => {
                self.fail(TABLE, job.index, Operation::Approve, &e);
                false
            }
        }
    }

    /// Best-effort native and token balance refresh after a swap.
    async fn refresh_row_balances(&self, index: usize, token: Address, owner: Address) {
        let client = self.client.as_ref();
        let erc20 = Erc20::new(client, token);
        let (native, held) = tokio::join!(client.balance(owner), erc20.balance_of(owner));

        self.emit(BatchEvent::BalanceUpdated {
            table: TABLE,
            index,
            balance: match native {
                Ok(value) => BalanceState::Loaded(value),
                Err(e) => BalanceState::Failed(e.detail()),
            },
        });
        self.emit(BatchEvent::TokenBalanceUpdated {
            index,
            balance: match held {
                Ok(value) => BalanceState::Loaded(value),
                Err(e) => BalanceState::Failed(e.detail()),
            },
        });
    }
}
