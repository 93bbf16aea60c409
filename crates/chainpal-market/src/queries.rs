//! Bitquery GraphQL documents. Every input travels as a variable.

pub const WRAPPED_SOL: &str = "So11111111111111111111111111111111111111112";
pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

/// OHLC candles against wrapped SOL plus the token's latest trade.
///
/// Variables: `mint`, `sol`, `unit` (`minutes`/`days`), `count`.
pub const CHART: &str = r#"
query Chart($mint: String!, $sol: String!, $unit: OLAP_DateTimeIntervalUnits!, $count: Int!) {
  Solana {
    ohlc: DEXTradeByTokens(
      orderBy: {descendingByField: "Block_Timefield"}
      where: {Trade: {Currency: {MintAddress: {is: $mint}}, Side: {Currency: {MintAddress: {is: $sol}}}, PriceAsymmetry: {lt: 0.1}}}
      limit: {count: 100}
    ) {
      Block {
        Timefield: Time(interval: {in: $unit, count: $count})
      }
      volume: sum(of: Trade_Amount)
      Trade {
        high: Price(maximum: Trade_Price)
        low: Price(minimum: Trade_Price)
        open: Price(minimum: Block_Slot)
        close: Price(maximum: Block_Slot)
        price_last: PriceInUSD(maximum: Block_Slot)
      }
      count
    }
    token_info: DEXTradeByTokens(
      where: {Trade: {Currency: {MintAddress: {is: $mint}}}}
      orderBy: {descending: Block_Time}
      limit: {count: 1}
    ) {
      Trade {
        Currency {
          Name
          Symbol
          Uri
          MintAddress
        }
        PriceInUSD
        Price
      }
    }
  }
}
"#;

/// Ten pump.fun tokens with the highest buy price.
pub const PUMPFUN_TOP_TOKENS: &str = r#"
query PumpFunTopTokens {
  Solana {
    DEXTrades(
      limitBy: {by: Trade_Buy_Currency_MintAddress, count: 1}
      orderBy: {descending: Trade_Buy_Price}
      where: {Trade: {Dex: {ProtocolName: {is: "pump"}}, Buy: {Currency: {MintAddress: {notIn: ["11111111111111111111111111111111"]}}}}, Transaction: {Result: {Success: true}}}
      limit: {count: 10}
    ) {
      Trade {
        Buy {
          Price
          PriceInUSD
          Currency {
            Name
            Symbol
            MintAddress
            Decimals
            Fungible
            Uri
          }
        }
      }
    }
  }
}
"#;

/// Twenty non-pump tokens by USD volume since `since`, stablecoin pairs excluded.
///
/// Variables: `since`, `sol`, `usdc`, `usdt`.
pub const TRENDING_TOKENS: &str = r#"
query TrendingTokens($since: DateTime!, $sol: String!, $usdc: String!, $usdt: String!) {
  Solana {
    DEXTradeByTokens(
      where: {
        Transaction: {Result: {Success: true}}
        Block: {Time: {after: $since}}
        Trade: {Dex: {ProtocolFamily: {not: "pump"}}}
        any: [
          {Trade: {Currency: {MintAddress: {notIn: [$usdc, $usdt]}}}}
          {Trade: {Currency: {MintAddress: {notIn: [$usdc, $sol]}}, Side: {Currency: {MintAddress: {is: $usdt}}}}}
          {Trade: {Currency: {MintAddress: {notIn: [$usdt, $sol]}}, Side: {Currency: {MintAddress: {is: $usdc}}}}}
          {Trade: {Currency: {MintAddress: {notIn: [$sol, $usdc, $usdt]}}, Side: {Currency: {MintAddress: {notIn: [$sol, $usdc, $usdt]}}}}}
        ]
      }
      orderBy: {descendingByField: "usd"}
      limit: {count: 20}
      limitBy: {by: Trade_Currency_MintAddress, count: 1}
    ) {
      Trade {
        Currency {
          Symbol
          Name
          MintAddress
          Uri
        }
        price_last: PriceInUSD(maximum: Block_Slot)
        price_1h_ago: PriceInUSD(minimum: Block_Slot)
      }
      dexes: uniq(of: Trade_Dex_ProgramAddress)
      amount: sum(of: Trade_Side_Amount)
      usd: sum(of: Trade_Side_AmountInUSD)
      traders: uniq(of: Trade_Account_Owner)
      count(selectWhere: {ge: "100"})
    }
  }
}
"#;

/// Twenty traders of `mint` by USD volume since `since`.
pub const TOP_TRADERS: &str = r#"
query TopTraders($mint: String!, $since: DateTime!) {
  Solana {
    DEXTradeByTokens(
      orderBy: {descendingByField: "volumeUsd"}
      limit: {count: 20}
      where: {Trade: {Currency: {MintAddress: {is: $mint}}, Side: {Amount: {gt: "0"}}}, Transaction: {Result: {Success: true}}, Block: {Time: {since: $since}}}
    ) {
      Trade {
        Account {
          Owner
        }
      }
      buys: count(if: {Trade: {Side: {Type: {is: buy}}}})
      sells: count(if: {Trade: {Side: {Type: {is: sell}}}})
      bought: sum(of: Trade_Amount, if: {Trade: {Side: {Type: {is: buy}}}})
      sold: sum(of: Trade_Amount, if: {Trade: {Side: {Type: {is: sell}}}})
      volume: sum(of: Trade_Amount)
      volumeUsd: sum(of: Trade_Side_AmountInUSD)
    }
  }
}
"#;

/// Latest supply of `mint` and its twenty largest holders since `since`.
pub const TOP_HOLDERS: &str = r#"
query TopHolders($mint: String!, $since: DateTime!) {
  Solana {
    TokenSupplyUpdates(
      where: {TokenSupplyUpdate: {Currency: {MintAddress: {is: $mint}}}}
      limit: {count: 1}
      orderBy: {descending: Block_Time}
    ) {
      TokenSupplyUpdate {
        PostBalance
        PostBalanceInUSD
      }
    }
    Top_holders: BalanceUpdates(
      orderBy: {descendingByField: "BalanceUpdate_balance_maximum"}
      limit: {count: 20}
      where: {BalanceUpdate: {Currency: {MintAddress: {is: $mint}}}, Block: {Time: {since: $since}}}
    ) {
      BalanceUpdate {
        Account {
          Owner
        }
        balance: PostBalance(maximum: Block_Slot)
      }
    }
  }
}
"#;

/// Up to twenty token balances owned by `owner`.
pub const WALLET_BALANCE: &str = r#"
query WalletBalance($owner: String!) {
  Solana {
    BalanceUpdates(
      limit: {count: 20}
      where: {BalanceUpdate: {Account: {Owner: {is: $owner}}}}
      orderBy: {descendingByField: "BalanceUpdate_Balance_maximum"}
    ) {
      BalanceUpdate {
        Balance: PostBalance(maximum: Block_Slot)
        Currency {
          Name
          Symbol
          MintAddress
          Uri
        }
      }
    }
  }
}
"#;
